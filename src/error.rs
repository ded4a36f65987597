use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The session transport refused a read or write.
    #[error("Session error: {0}")]
    Session(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<base64::DecodeError> for StoreError {
    fn from(err: base64::DecodeError) -> Self {
        StoreError::Codec(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
