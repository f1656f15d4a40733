//! Session management module.
//!
//! This module contains everything that decides whether a user is signed in:
//! - `KeyValueStore` implementations persisting the session record
//! - `SessionManager` holding the observable session state
//! - `AuthGate`, the navigation gate derived from that state
//! - Session error handling

mod error;
mod gate;
mod manager;
mod store;

pub use error::{SessionError, StoreError};
pub use gate::AuthGate;
pub use manager::{Session, SessionManager, SessionState};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
