//! Session-specific error types.

/// Errors raised by a key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key contains characters the store does not accept
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Reading or writing the entry failed
    #[error("Failed to access entry '{key}': {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },

    /// In-memory store lock was poisoned
    #[error("Key-value store lock poisoned")]
    Poisoned,
}

/// Errors that can occur while signing in or out.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Key-value store failure
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Failed to encode the session record
    #[error("Failed to serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::InvalidKey("a/b".to_string());
        assert!(error.to_string().contains("Invalid key"));
        assert!(error.to_string().contains("a/b"));

        let error = StoreError::Io {
            key: "session".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("session"));
        assert!(error.to_string().contains("denied"));

        let error = StoreError::Poisoned;
        assert!(error.to_string().contains("poisoned"));
    }

    #[test]
    fn test_session_error_from_store_error() {
        let error: SessionError = StoreError::Poisoned.into();
        assert!(matches!(error, SessionError::Store(_)));
        assert!(error.to_string().contains("Session store error"));
    }
}
