use thiserror::Error;

// Token decoding failures. Any of these fails the request outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Error decoding signature")]
    InvalidSignature,
    #[error("Signature has expired")]
    Expired,
    #[error("Error decoding token")]
    Malformed,
    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("Error encoding token")]
    Encoding,
}

// Failures reported by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // A uniqueness constraint rejected the write.
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
