//! Key-value stores backing the session record.
//!
//! Platform secure storage is reduced to three calls on string keys and
//! values. Repeating an identical `set` or `delete` leaves the same result.

use super::error::StoreError;
use log::*;
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Asynchronous string key-value storage.
///
pub trait KeyValueStore: Send + Sync {
    /// Return the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Store the value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the value. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Keys are limited to alphanumerics, `.`, `-` and `_`, as mobile secure
/// stores require. This also keeps keys usable as file names.
///
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid && key != "." && key != ".." {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

/// Stores each key as a file in a directory.
///
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Return a store rooted at the directory. The directory is created on the
    /// first write.
    ///
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKeyValueStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io {
                key: key.to_owned(),
                source: e,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        let io_error = |e: std::io::Error| StoreError::Io {
            key: key.to_owned(),
            source: e,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;
        tokio::fs::write(&path, value).await.map_err(io_error)?;
        debug!("Stored entry '{}' in {}.", key, self.dir.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed entry '{}' from {}.", key, self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                key: key.to_owned(),
                source: e,
            }),
        }
    }
}

/// Process-local store. Entries vanish with the process.
///
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        MemoryKeyValueStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_accepts_secure_store_keys() {
        assert!(validate_key("session").is_ok());
        assert!(validate_key("session_token").is_ok());
        assert!(validate_key("user.v2-x").is_ok());
    }

    #[test]
    fn validate_key_rejects_paths_and_blanks() {
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("with space").is_err());
    }

    #[tokio::test]
    async fn file_store_set_get_delete() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileKeyValueStore::new(dir.path().join("secure-store"));

        assert_eq!(store.get("session").await?, None);
        store.set("session", "{\"email\":\"a@b.c\"}").await?;
        assert_eq!(
            store.get("session").await?.as_deref(),
            Some("{\"email\":\"a@b.c\"}")
        );

        store.delete("session").await?;
        assert_eq!(store.get("session").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn file_store_is_idempotent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileKeyValueStore::new(dir.path());

        store.set("session", "one").await?;
        store.set("session", "one").await?;
        assert_eq!(store.get("session").await?.as_deref(), Some("one"));

        store.delete("session").await?;
        store.delete("session").await?;
        assert_eq!(store.get("session").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn file_store_survives_new_handle() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        FileKeyValueStore::new(dir.path()).set("session", "kept").await?;

        let reopened = FileKeyValueStore::new(dir.path());
        assert_eq!(reopened.get("session").await?.as_deref(), Some("kept"));
        Ok(())
    }

    #[tokio::test]
    async fn file_store_rejects_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "x").await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn file_store_read_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        // A directory where the entry file should be cannot be read as text.
        std::fs::create_dir(dir.path().join("session")).unwrap();
        assert!(matches!(
            store.get("session").await,
            Err(StoreError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn memory_store_set_get_delete() -> anyhow::Result<()> {
        let store = MemoryKeyValueStore::new();
        assert!(store.is_empty());

        store.set("session", "value").await?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("session").await?.as_deref(), Some("value"));

        store.delete("session").await?;
        store.delete("session").await?;
        assert!(store.is_empty());
        Ok(())
    }
}
