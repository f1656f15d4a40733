//! Task storage error types.

use std::path::PathBuf;

/// Errors that can occur during task database operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite reported a failure
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A task with this id already exists
    #[error("Task already exists: {id}")]
    DuplicateId { id: String },

    /// The store was used before `migrate()` succeeded
    #[error("Database schema not migrated")]
    NotMigrated,

    /// A previous operation panicked while holding the connection
    #[error("Database connection lock poisoned")]
    ConnectionPoisoned,

    /// The blocking database task did not complete
    #[error("Database task failed: {0}")]
    Join(String),

    /// Failed to create the database directory
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}
