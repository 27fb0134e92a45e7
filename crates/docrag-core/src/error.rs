use thiserror::Error;

/// Failure taxonomy for the ingestion and retrieval pipeline.
///
/// `InvalidConfig` aborts before any I/O; `EmptyInput` ends an ingestion run
/// without touching previously persisted state; `IndexNotReady` and
/// `InvalidArgument` are caller errors on the query path; `CorruptState` means
/// the persisted artifacts disagree and is never silently repaired.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Index not ready: {0}")]
    IndexNotReady(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Corrupt persisted state: {0}")]
    CorruptState(String),

    #[error("Extraction failed for {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
