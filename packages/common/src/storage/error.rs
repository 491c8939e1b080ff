use thiserror::Error;

/// Errors that can occur during asset storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested asset was not found.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The provided asset key is malformed.
    #[error("invalid asset key: {0}")]
    InvalidKey(String),
    /// The provided asset kind is unknown.
    #[error("invalid asset kind: {0}")]
    InvalidKind(String),
    /// The file exceeds the configured size limit.
    #[error("asset exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
