//! Application-wide error types.
//!
//! This module defines the top of the error hierarchy. Each subsystem owns its
//! own error enum and converts into [`AppError`] through `#[from]`.

pub use crate::config::ConfigError;
pub use crate::session::{SessionError, StoreError};
pub use crate::tasks::StorageError;

/// Main application error type.
///
/// Encompasses every error type in the crate so the facade can return a single
/// result type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task database errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::Session(SessionError::from(error))
    }
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
