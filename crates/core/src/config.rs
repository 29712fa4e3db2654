use crate::answer::{DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL};
use crate::chunk::ChunkerConfig;
use crate::retrieve::RetrievalConfig;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Language-model call settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            temperature: 0.1,
        }
    }
}

/// Everything one invocation of the pipeline needs, constructed explicitly
/// at startup and passed down; there is no ambient process-wide state.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub docs_dir: PathBuf,
    pub index_cache_path: PathBuf,
    pub store_cache_path: PathBuf,
    pub chunker: ChunkerConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

impl AgentConfig {
    pub fn new(docs_dir: PathBuf, cache_dir: &Path, llm: LlmConfig) -> Self {
        Self {
            docs_dir,
            index_cache_path: cache_dir.join("cache_index.bin"),
            store_cache_path: cache_dir.join("cache_store.bin"),
            chunker: ChunkerConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm,
        }
    }
}

/// Reads a dotenv-style `KEY=VALUE` file. Blank lines and `#` comments are
/// skipped; surrounding quotes on values are dropped.
pub fn read_env_file(path: &Path) -> io::Result<HashMap<String, String>> {
    let mut variables = HashMap::new();

    for line in fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            variables.insert(key.trim().to_string(), value.to_string());
        }
    }

    Ok(variables)
}
