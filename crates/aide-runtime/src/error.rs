/// Result type for aide-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database/index layer error
    #[error("Index error: {0}")]
    Index(#[from] aide_index::Error),

    /// Provider layer error
    #[error("Provider error: {0}")]
    Provider(#[from] aide_providers::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No stored session has this id
    #[error("Session not found: {session_id}")]
    NotFound { session_id: String },
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
