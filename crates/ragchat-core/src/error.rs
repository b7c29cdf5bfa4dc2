use thiserror::Error;

/// Top-level error type for the ragchat workspace.
///
/// Subsystem crates define their own error types and implement
/// `From<RagchatError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RagchatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for RagchatError {
    fn from(err: toml::de::Error) -> Self {
        RagchatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RagchatError {
    fn from(err: toml::ser::Error) -> Self {
        RagchatError::Config(err.to_string())
    }
}

/// A specialized `Result` type for ragchat operations.
pub type Result<T> = std::result::Result<T, RagchatError>;
