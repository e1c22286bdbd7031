use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failures while loading or decoding the job configuration. All fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to retrieve secret: {0}")]
    Retrieve(String),

    #[error("secret has no string payload")]
    EmptySecret,

    #[error("failed to decode secret payload: {0}")]
    Decode(#[from] serde_json::Error),
}
