use super::error::SessionError;
use super::gate::AuthGate;
use super::store::KeyValueStore;
use crate::config::Credentials;
use fake::Dummy;
use log::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// The signed-in identity as persisted in the key-value store.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
}

/// Observable authentication state.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub is_loading: bool,
    pub session: Option<Session>,
}

impl SessionState {
    fn loading() -> Self {
        SessionState {
            is_loading: true,
            session: None,
        }
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::from(self)
    }
}

/// Owns the session state and keeps it in step with the key-value store.
///
/// Subscribers receive every change through a `watch` channel, so the
/// navigation gate can be re-evaluated without polling.
///
pub struct SessionManager<S> {
    store: S,
    key: String,
    credentials: Credentials,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Return a manager in the loading state. Call [`SessionManager::initialize`]
    /// to read the stored session.
    ///
    pub fn new(store: S, key: &str, credentials: Credentials) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        SessionManager {
            store,
            key: key.to_owned(),
            credentials,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// Read the stored session once and leave the loading state. Later calls
    /// do nothing.
    ///
    /// Reading fails open: an unreadable or undecodable entry leaves the user
    /// signed out. A sign-in or sign-out that settled the state while the read
    /// was pending takes precedence over the stored value.
    ///
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized, skipping read.");
            return;
        }

        info!("Restoring stored session...");
        let session = self.read_session().await;
        match &session {
            Some(session) => info!("Restored session for '{}'.", session.email),
            None => info!("No stored session."),
        }
        let applied = self.state.send_if_modified(|state| {
            if !state.is_loading {
                return false;
            }
            state.is_loading = false;
            state.session = session;
            true
        });
        if !applied {
            debug!("Session settled during restore, keeping it.");
        }
    }

    async fn read_session(&self) -> Option<Session> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Ignoring undecodable stored session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read stored session, starting signed out: {}", e);
                None
            }
        }
    }

    /// Check the credentials and, on a match, persist and publish the session.
    /// Returns `Ok(false)` without touching anything on a mismatch.
    ///
    /// A successful sign-in also ends the loading state. If persisting fails
    /// the in-memory state is left as it was.
    ///
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<bool, SessionError> {
        if !self.credentials.matches(email, password) {
            info!("Rejected sign-in for '{}'.", email);
            return Ok(false);
        }

        let session = Session {
            email: email.to_owned(),
        };
        let raw = serde_json::to_string(&session)?;
        self.store.set(&self.key, &raw).await?;
        info!("Signed in as '{}'.", email);
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.session = Some(session);
        });
        Ok(true)
    }

    /// Remove the stored session and publish the signed-out state.
    ///
    /// A successful sign-out also ends the loading state. If removal fails the
    /// in-memory state is left as it was.
    ///
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.store.delete(&self.key).await?;
        info!("Signed out.");
        self.state.send_if_modified(|state| {
            let changed = state.is_loading || state.session.is_some();
            state.is_loading = false;
            state.session = None;
            changed
        });
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn gate(&self) -> AuthGate {
        self.state.borrow().gate()
    }

    /// Return a receiver notified on every state change.
    ///
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
