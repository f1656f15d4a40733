use crate::config::Config;
use crate::error::AppResult;
use crate::notice::{self, Notice, NoticeSender};
use crate::session::{AuthGate, FileKeyValueStore, Session, SessionManager, SessionState};
use crate::tasks::{Outcome, TaskListController, TaskStore};
use log::*;
use std::fmt;
use tokio::sync::watch;

/// Specify the user intents the presentation layer forwards.
///
#[derive(Clone, PartialEq, Eq)]
pub enum Intent {
    SignIn { email: String, password: String },
    SignOut,
    CreateTask { title: String },
    ToggleTask { id: String },
    DeleteTask { id: String },
    Reload,
}

impl Intent {
    /// Short name for logging. Keeps credentials out of the log.
    ///
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SignIn { .. } => "sign-in",
            Intent::SignOut => "sign-out",
            Intent::CreateTask { .. } => "create-task",
            Intent::ToggleTask { .. } => "toggle-task",
            Intent::DeleteTask { .. } => "delete-task",
            Intent::Reload => "reload",
        }
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::SignIn { email, .. } => f
                .debug_struct("SignIn")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Intent::SignOut => f.write_str("SignOut"),
            Intent::CreateTask { title } => {
                f.debug_struct("CreateTask").field("title", title).finish()
            }
            Intent::ToggleTask { id } => f.debug_struct("ToggleTask").field("id", id).finish(),
            Intent::DeleteTask { id } => f.debug_struct("DeleteTask").field("id", id).finish(),
            Intent::Reload => f.write_str("Reload"),
        }
    }
}

/// Oversees the session and the task list, and routes intents between them.
///
/// The task list exists only while the session gate is open: it is activated
/// on sign-in (or on start with a stored session) and dropped on sign-out.
///
pub struct App {
    session: SessionManager<FileKeyValueStore>,
    store: TaskStore,
    tasks: Option<TaskListController>,
    notices: Option<NoticeSender>,
}

impl App {
    /// Open the task database and session store for the configuration, restore
    /// the stored session and, if signed in, load the task list.
    ///
    pub async fn start(config: &Config, notices: Option<NoticeSender>) -> AppResult<App> {
        info!("Starting application...");
        let data_path = config.data_path()?;
        tokio::fs::create_dir_all(&data_path).await?;
        debug!("Using data directory {}.", data_path.display());
        let store = TaskStore::open(&config.database_path()?)?;
        let session = SessionManager::new(
            FileKeyValueStore::new(config.secure_store_path()?),
            &config.session_key,
            config.credentials.clone(),
        );

        let mut app = App {
            session,
            store,
            tasks: None,
            notices,
        };
        app.session.initialize().await;
        app.sync_tasks().await;
        info!("Application ready ({:?}).", app.gate());
        Ok(app)
    }

    /// Handle an intent by type.
    ///
    pub async fn dispatch(&mut self, intent: Intent) -> Outcome {
        debug!("Processing intent '{}'...", intent.name());
        match intent {
            Intent::SignIn { email, password } => self.sign_in(&email, &password).await,
            Intent::SignOut => self.sign_out().await,
            Intent::CreateTask { title } => match self.tasks.as_mut() {
                Some(tasks) => tasks.create(&title).await,
                None => App::signed_out(),
            },
            Intent::ToggleTask { id } => match self.tasks.as_mut() {
                Some(tasks) => tasks.toggle(&id).await,
                None => App::signed_out(),
            },
            Intent::DeleteTask { id } => match self.tasks.as_mut() {
                Some(tasks) => tasks.remove(&id).await,
                None => App::signed_out(),
            },
            Intent::Reload => match self.tasks.as_mut() {
                Some(tasks) => tasks.activate().await,
                None => App::signed_out(),
            },
        }
    }

    fn signed_out() -> Outcome {
        warn!("Ignoring task intent while signed out.");
        Outcome::Ignored
    }

    async fn sign_in(&mut self, email: &str, password: &str) -> Outcome {
        match self.session.sign_in(email, password).await {
            Ok(true) => {
                self.sync_tasks().await;
                Outcome::Applied
            }
            Ok(false) => {
                notice::report(
                    self.notices.as_ref(),
                    Notice::invalid("Incorrect email or password."),
                );
                Outcome::Ignored
            }
            Err(e) => {
                error!("Failed to persist session: {}", e);
                notice::report(
                    self.notices.as_ref(),
                    Notice::error("Could not save the session."),
                );
                Outcome::Failed
            }
        }
    }

    async fn sign_out(&mut self) -> Outcome {
        match self.session.sign_out().await {
            Ok(()) => {
                self.sync_tasks().await;
                Outcome::Applied
            }
            Err(e) => {
                error!("Failed to remove session: {}", e);
                notice::report(self.notices.as_ref(), Notice::error("Could not sign out."));
                Outcome::Failed
            }
        }
    }

    /// Activate the task list when the gate is open, drop it when closed.
    ///
    async fn sync_tasks(&mut self) {
        let authenticated = self.gate().is_authenticated();
        if authenticated && self.tasks.is_none() {
            let mut tasks = TaskListController::new(self.store.clone(), self.notices.clone());
            tasks.activate().await;
            self.tasks = Some(tasks);
        } else if !authenticated && self.tasks.is_some() {
            debug!("Releasing task list after sign-out.");
            self.tasks = None;
        }
    }

    pub fn gate(&self) -> AuthGate {
        self.session.gate()
    }

    pub fn session(&self) -> Option<Session> {
        self.session.session()
    }

    /// Return a receiver notified on every session change.
    ///
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// The task list, present only while signed in.
    ///
    pub fn tasks(&self) -> Option<&TaskListController> {
        self.tasks.as_ref()
    }
}
