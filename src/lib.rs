//! Core of a local to-do list application.
//!
//! A user signs in against a configured credential pair, then creates, toggles
//! and deletes tasks persisted in an embedded SQLite database. Rendering and
//! navigation belong to the presentation layer, which drives this crate through
//! [`App`] and observes it through session subscriptions and [`Notice`]s.

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod notice;
pub mod session;
pub mod tasks;

pub use app::{App, Intent};
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use notice::{Notice, NoticeKind, NoticeSender};
pub use session::{AuthGate, Session, SessionManager, SessionState};
pub use tasks::{Outcome, Task, TaskListController, TaskStore};
