use thiserror::Error;

/// Result type alias for router operations
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Errors that can occur while routing a request
#[derive(Error, Debug)]
pub enum RouterError {
    /// The bucket listing produced no experiment directories; selection has
    /// nothing to index into.
    #[error("no experiments discovered in the backing store")]
    EmptyExperimentSet,

    #[error("fingerprint serialization failed: {0}")]
    Fingerprint(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
