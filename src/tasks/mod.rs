//! Task persistence and the in-memory task list.
//!
//! - `TaskStore` owns the SQLite connection, schema migrations and CRUD
//! - `TaskListController` mirrors the store in memory and applies user edits
//! - Storage error handling

mod controller;
mod error;
mod model;
mod store;

pub use controller::{Outcome, TaskListController};
pub use error::StorageError;
pub use model::Task;
pub use store::{TaskStore, SCHEMA_VERSION};
