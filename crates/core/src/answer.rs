use crate::config::LlmConfig;
use crate::error::QueryError;
use crate::models::ContextBlock;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

const SYSTEM_PROMPT: &str = "\
Voce e o Assistente CPM. Responda com base apenas nos documentos fornecidos.
Responda de forma direta e objetiva, cite datas e documentos exatamente.
Nunca invente respostas.";

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatReply {
    content: String,
}

/// Joins the retrieved passages into the prompt context section.
pub fn render_context(blocks: &[ContextBlock]) -> String {
    blocks
        .iter()
        .map(ContextBlock::render)
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn build_user_prompt(question: &str, blocks: &[ContextBlock]) -> String {
    format!(
        "DOCUMENTOS DISPONIVEIS:\n{}\n\nPERGUNTA DO CANDIDATO:\n{}",
        render_context(blocks),
        question
    )
}

/// Formats the retrieved context into a chat prompt and calls the language
/// model synchronously. One attempt, no retry; any failure is fatal for
/// the invocation.
pub struct AnswerGenerator {
    client: Client,
    config: LlmConfig,
}

impl AnswerGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn answer(
        &self,
        question: &str,
        context: &[ContextBlock],
    ) -> Result<String, QueryError> {
        let payload = ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(question, context),
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(QueryError::BackendResponse {
                backend: self.config.endpoint.clone(),
                details: format!("status {}", response.status()),
            });
        }

        let payload: ChatResponse = response.json()?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| QueryError::BackendResponse {
                backend: self.config.endpoint.clone(),
                details: "response carried no choices".to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}
