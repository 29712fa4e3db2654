use crate::embed::Embedder;
use crate::error::QueryError;
use crate::models::ContextBlock;
use crate::store::KnowledgeBase;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Fixed answer used when no passage survives filtering. The caller prints
/// it directly instead of invoking the generator.
pub const NO_MATCH_ANSWER: &str = "Nao encontrei informacoes relevantes nos editais.";

/// Portuguese function words dropped from the keyword query. Interrogatives
/// (quando, onde, como) are kept on purpose: they carry retrieval signal in
/// questions about schedules and procedures.
const STOPWORDS: [&str; 27] = [
    "o", "a", "os", "as", "de", "da", "do", "das", "dos", "um", "uma", "uns", "umas", "para",
    "com", "em", "no", "na", "nos", "nas", "que", "e", "sao", "são", "sobre", "pelo", "pela",
];

/// Tuning knobs for retrieval. The defaults were calibrated against the
/// fixed embedding model and must stay as-is for equivalent ranking.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalConfig {
    /// Candidates requested for the full-question query.
    pub semantic_top_k: usize,
    /// Candidates requested for the key-term query.
    pub keyword_top_k: usize,
    /// Hard cap on context passages handed to the generator.
    pub max_context_chunks: usize,
    /// Distance cutoff; candidates scoring above it are irrelevant.
    pub score_threshold: f32,
    /// Chars of chunk text hashed for near-duplicate detection.
    pub fingerprint_prefix_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_top_k: 50,
            keyword_top_k: 30,
            max_context_chunks: 20,
            score_threshold: 8.0,
            fingerprint_prefix_chars: 150,
        }
    }
}

/// Key terms of a question: lowercased whitespace tokens with edge
/// punctuation trimmed, minus stopwords and tokens of two chars or fewer.
pub fn extract_key_terms(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().count() > 2 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Dual-query retrieval: one semantic pass with the whole question, one
/// keyword pass with the extracted terms, merged into a single ranked,
/// deduplicated, thresholded context list.
///
/// The raw question can miss chunks that match on exact terminology (dates,
/// document names); the keyword pass recovers them, and the merge step
/// prunes the resulting redundancy.
pub struct HybridRetriever {
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn retrieve<E: Embedder>(
        &self,
        embedder: &mut E,
        base: &KnowledgeBase,
        question: &str,
    ) -> Result<Vec<ContextBlock>, QueryError> {
        let question_vector = embedder.embed_query(question)?;
        let mut candidates = base.search(&question_vector, self.config.semantic_top_k);

        let terms = extract_key_terms(question);
        if !terms.is_empty() {
            let term_vector = embedder.embed_query(&terms.join(" "))?;
            candidates.extend(base.search(&term_vector, self.config.keyword_top_k));
        }

        candidates.sort_by(|left, right| left.1.total_cmp(&right.1));

        let mut seen = HashSet::new();
        let mut context = Vec::new();

        for (chunk, score) in candidates {
            if score > self.config.score_threshold {
                continue;
            }
            if !seen.insert(fingerprint(&chunk.text, self.config.fingerprint_prefix_chars)) {
                continue;
            }

            context.push(ContextBlock {
                source: chunk.source.clone(),
                text: chunk.text.clone(),
            });
            if context.len() >= self.config.max_context_chunks {
                break;
            }
        }

        Ok(context)
    }
}

/// Stable near-duplicate fingerprint over a fixed-length text prefix. The
/// exact hash is not load-bearing; only the prefix length is.
fn fingerprint(text: &str, prefix_chars: usize) -> [u8; 32] {
    let prefix: String = text.chars().take(prefix_chars).collect();
    Sha256::digest(prefix.as_bytes()).into()
}
