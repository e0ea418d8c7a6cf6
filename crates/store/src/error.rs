use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure.
///
/// `Duplicate` is the only variant callers are expected to branch on; the rest
/// are reported as internal errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not connect to storage: {0}")]
    Connection(String),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A unique field already holds this value in the collection.
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(String),

    #[error("storage error: {0}")]
    Backend(String),

    #[error("unsupported database url scheme: {0}")]
    UnsupportedBackend(String),
}
