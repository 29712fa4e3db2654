use serde::{Deserialize, Serialize};

/// A bounded slice of normalized regulation text, the unit of retrieval.
///
/// Immutable once created; owned by the document store after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// File name of the originating PDF, e.g. `edital_2026.pdf`.
    pub source: String,
    pub page: u32,
    pub chunk_index: u64,
    pub text: String,
}

/// A retrieved passage formatted for the generation prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBlock {
    pub source: String,
    pub text: String,
}

impl ContextBlock {
    pub fn render(&self) -> String {
        format!("[{}]\n{}\n", self.source, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::ContextBlock;

    #[test]
    fn context_block_renders_labeled_passage() {
        let block = ContextBlock {
            source: "edital_2026.pdf".to_string(),
            text: "A matricula ocorre em janeiro.".to_string(),
        };

        assert_eq!(
            block.render(),
            "[edital_2026.pdf]\nA matricula ocorre em janeiro.\n"
        );
    }
}
