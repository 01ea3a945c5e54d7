use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for render store operations
pub type Result<T> = std::result::Result<T, RenderStoreError>;

/// Errors that can occur in the render store tooling
#[derive(Error, Debug)]
pub enum RenderStoreError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error originating from the Qdrant client
    #[error("Qdrant client error: {0}")]
    QdrantError(#[from] qdrant_client::QdrantError),

    /// Custom error during a Qdrant operation (e.g., unexpected response)
    #[error("Qdrant operation error: {0}")]
    QdrantOperationError(String),

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Object '{0}' not found")]
    ObjectNotFound(String),

    #[error("Invalid object id '{0}': expected a UUID")]
    InvalidObjectId(String),

    /// The liveness assertion failed. Callers print this message verbatim.
    #[error("vector store is not live")]
    NotLive,

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("Embedding dimension mismatch in {path}: expected {expected}, found {found}")]
    DimensionMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Caption index error: {0}")]
    CaptionError(String),

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Error serializing or deserializing data: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{operation} timed out after {secs}s")]
    OperationTimeout { operation: String, secs: u64 },

    #[error("Other error: {0}")]
    Other(String),
}
