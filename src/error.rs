use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesAnalyticsError {
    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SalesAnalyticsError>;
