pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod retrieve;
pub mod store;

pub use answer::{render_context, AnswerGenerator, DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL};
pub use chunk::{build_chunks, split_text, ChunkerConfig};
pub use config::{read_env_file, AgentConfig, LlmConfig};
pub use embed::{
    Embedder, SentenceEmbedder, EMBEDDING_DIMENSIONS, EMBEDDING_MODEL_NAME,
};
pub use error::{EmbeddingError, IngestError, QueryError, Result};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use ingest::{
    discover_pdf_files, ingest_documents, load_or_build, IngestionReport, SkippedPdf,
};
pub use models::{ContextBlock, DocumentChunk};
pub use normalize::TextNormalizer;
pub use retrieve::{extract_key_terms, HybridRetriever, RetrievalConfig, NO_MATCH_ANSWER};
pub use store::{BuildStamp, DocumentStore, KnowledgeBase, ScoredHit, VectorIndex};
