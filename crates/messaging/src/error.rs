use thiserror::Error;

pub type Result<T> = std::result::Result<T, MessagingError>;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Envelope serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Envelope of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Transport closed: {0}")]
    Closed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
