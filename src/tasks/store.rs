//! SQLite-backed task storage.
//!
//! One connection is opened per process and shared between handles. Every
//! query runs on tokio's blocking pool so callers only ever await. The schema
//! is versioned through `PRAGMA user_version`; see [`TaskStore::migrate`].

use super::error::StorageError;
use super::model::Task;
use log::*;
use rusqlite::{ffi, params, Connection};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Schema version the current code expects.
pub const SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Ordered schema steps. Append only; never edit a released step.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create tasks table",
    sql: r#"
CREATE TABLE IF NOT EXISTS tasks (
  id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  completed INTEGER NOT NULL DEFAULT 0
);
"#,
}];

/// Handle to the task database. Clones share the connection and the
/// migration flag.
///
#[derive(Clone)]
pub struct TaskStore {
    conn: Arc<Mutex<Connection>>,
    migrated: Arc<AtomicBool>,
    file_backed: bool,
}

impl TaskStore {
    /// Open (or create) the database file, creating its directory first.
    ///
    pub fn open(path: &Path) -> Result<TaskStore, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening task database at {}...", path.display());
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(TaskStore::from_connection(conn, true))
    }

    /// Open a private in-memory database.
    ///
    pub fn open_in_memory() -> Result<TaskStore, StorageError> {
        debug!("Opening in-memory task database...");
        Ok(TaskStore::from_connection(Connection::open_in_memory()?, false))
    }

    fn from_connection(conn: Connection, file_backed: bool) -> TaskStore {
        TaskStore {
            conn: Arc::new(Mutex::new(conn)),
            migrated: Arc::new(AtomicBool::new(false)),
            file_backed,
        }
    }

    /// Run the closure against the connection on the blocking pool.
    ///
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StorageError::ConnectionPoisoned)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Join(e.to_string()))?
    }

    fn ensure_migrated(&self) -> Result<(), StorageError> {
        if self.migrated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::NotMigrated)
        }
    }

    /// Bring the schema up to [`SCHEMA_VERSION`], returning how many steps ran.
    /// Each step commits together with its version bump, so an interrupted
    /// migration resumes at the failed step. Calling it again is a no-op.
    ///
    pub async fn migrate(&self) -> Result<usize, StorageError> {
        let file_backed = self.file_backed;
        let applied = self
            .with_conn(move |conn| migrate_connection(conn, file_backed))
            .await?;
        self.migrated.store(true, Ordering::SeqCst);
        Ok(applied)
    }

    /// Return the persisted schema version.
    ///
    pub async fn schema_version(&self) -> Result<u32, StorageError> {
        self.with_conn(|conn| Ok(read_user_version(conn)?)).await
    }

    /// Return every task, most recently inserted first.
    ///
    pub async fn list_all(&self) -> Result<Vec<Task>, StorageError> {
        self.ensure_migrated()?;
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, title, completed FROM tasks ORDER BY rowid DESC")?;
            let rows = stmt.query_map([], |row| {
                let completed: Option<i64> = row.get(2)?;
                Ok(Task {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    completed: completed.unwrap_or(0) != 0,
                })
            })?;
            let tasks = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await
    }

    /// Insert a new task. An existing id is a [`StorageError::DuplicateId`].
    ///
    pub async fn insert(&self, task: &Task) -> Result<(), StorageError> {
        self.ensure_migrated()?;
        let task = task.clone();
        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO tasks (id, title, completed) VALUES (?1, ?2, ?3)",
                params![task.id, task.title, task.completed],
            );
            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    Err(StorageError::DuplicateId { id: task.id })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Set the completed flag. Returns false when no task has the id.
    ///
    pub async fn update(&self, id: &str, completed: bool) -> Result<bool, StorageError> {
        self.ensure_migrated()?;
        let id = id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = ?1 WHERE id = ?2",
                params![completed, id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    /// Delete the task. Returns false when no task has the id.
    ///
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        self.ensure_migrated()?;
        let id = id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
    }
}

fn read_user_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

fn migrate_connection(conn: &mut Connection, file_backed: bool) -> Result<usize, StorageError> {
    let current = read_user_version(conn)?;
    if current >= SCHEMA_VERSION {
        debug!("Task database already at schema v{}.", current);
        return Ok(0);
    }

    if file_backed {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!("Task database journal mode: {}.", mode);
    }

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            "Applying schema migration v{} ({})...",
            migration.version, migration.description
        );
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        applied += 1;
    }
    info!("Task database migrated from v{} to v{}.", current, SCHEMA_VERSION);
    Ok(applied)
}
