use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Invalid settings for backend {backend}: {reason}")]
    InvalidSettings { backend: String, reason: String },

    #[error("Backend {backend} failed: {reason}")]
    AdapterFailure { backend: String, reason: String },

    #[error("Cannot aggregate an empty sample")]
    EmptySample,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchError {
    pub fn adapter(backend: &str, reason: impl Into<String>) -> Self {
        BenchError::AdapterFailure {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }

    pub fn settings(backend: &str, reason: impl Into<String>) -> Self {
        BenchError::InvalidSettings {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
