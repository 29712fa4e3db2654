use thiserror::Error;

/// Failure inside an embedding backend. Kept as its own type so both the
/// ingestion and query paths can absorb it.
#[derive(Debug, Error)]
#[error("embedding failed: {0}")]
pub struct EmbeddingError(pub String);

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("documents directory not found: {0}")]
    MissingDocumentsDir(String),

    #[error("no pdf files found in {0}")]
    NoPdfsFound(String),

    #[error("no chunks produced from {0}: nothing to index")]
    NoChunks(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("cache serialization error: {0}")]
    Cache(#[from] bincode::Error),

    #[error("cache artifact mismatch: {0}")]
    CacheMismatch(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("query request failed: {0}")]
    Request(String),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
