use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `key` is relative to the `[logger]` table
    #[error("Invalid logger setting '{key}': {message}")]
    InvalidSetting { key: &'static str, message: String },

    #[error("Logger already initialized: {message}")]
    AlreadyInitialized { message: String },
}

impl LoggerError {
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            message: message.into(),
        }
    }
}
