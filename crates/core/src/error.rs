use thiserror::Error;

pub type PacingResult<T> = Result<T, PacingError>;

#[derive(Error, Debug)]
pub enum PacingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Snapshot validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for PacingError {
    fn from(e: config::ConfigError) -> Self {
        PacingError::Config(e.to_string())
    }
}
