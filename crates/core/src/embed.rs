use crate::error::EmbeddingError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// The fixed multilingual sentence model the whole pipeline is tuned
/// against; the retrieval score threshold assumes its vector space.
pub const EMBEDDING_MODEL_NAME: &str = "paraphrase-multilingual-mpnet-base-v2";
pub const EMBEDDING_DIMENSIONS: usize = 768;

pub trait Embedder {
    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn embed_query(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError("empty embedding response".to_string()))
    }
}

/// Local sentence-transformer inference. The model is downloaded on first
/// use and cached; afterwards embedding runs fully offline.
pub struct SentenceEmbedder {
    model: TextEmbedding,
}

impl SentenceEmbedder {
    pub fn new() -> Result<Self, EmbeddingError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::ParaphraseMLMpnetBaseV2)
                .with_show_download_progress(false),
        )
        .map_err(|error| EmbeddingError(error.to_string()))?;

        Ok(Self { model })
    }
}

impl Embedder for SentenceEmbedder {
    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.model
            .embed(texts.to_vec(), None)
            .map_err(|error| EmbeddingError(error.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Embedder;
    use crate::error::EmbeddingError;

    /// Deterministic embedder for tests: hashes whitespace tokens into a
    /// small fixed-dimension vector, so related texts land near each other.
    pub struct TokenHashEmbedder {
        pub dimensions: usize,
    }

    impl Default for TokenHashEmbedder {
        fn default() -> Self {
            Self { dimensions: 64 }
        }
    }

    impl Embedder for TokenHashEmbedder {
        fn model_name(&self) -> &str {
            "token-hash-test"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|text| embed_one(text, self.dimensions)).collect())
        }
    }

    pub fn embed_one(text: &str, dimensions: usize) -> Vec<f32> {
        let mut vector = vec![0f32; dimensions];
        for token in text.to_lowercase().split_whitespace() {
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % dimensions as u64) as usize] += 1.0;
        }
        vector
    }

    #[test]
    fn token_hash_embedder_is_deterministic() {
        let mut embedder = TokenHashEmbedder::default();
        let first = embedder.embed_query("prazo de matricula").unwrap();
        let second = embedder.embed_query("prazo de matricula").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
