use super::error::StorageError;
use super::model::Task;
use super::store::TaskStore;
use crate::notice::{self, Notice, NoticeSender};
use log::*;

/// Result of a user operation on the task list.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store confirmed the change and the list reflects it.
    Applied,
    /// Nothing to do: blank input or an unknown id.
    Ignored,
    /// The store failed; a notice was sent and the list is unchanged.
    Failed,
}

/// Keeps an in-memory task list consistent with the [`TaskStore`].
///
/// Every mutation is written to the store first and mirrored in memory only
/// once the store confirms it. Methods take `&mut self`, so one controller
/// never has two operations in flight.
///
pub struct TaskListController {
    store: TaskStore,
    tasks: Vec<Task>,
    last_id: i64,
    notices: Option<NoticeSender>,
}

impl TaskListController {
    /// Return an empty controller. Call [`TaskListController::activate`] to
    /// load the stored tasks.
    ///
    pub fn new(store: TaskStore, notices: Option<NoticeSender>) -> Self {
        TaskListController {
            store,
            tasks: vec![],
            last_id: 0,
            notices,
        }
    }

    /// Migrate the schema and load every stored task into memory.
    ///
    pub async fn activate(&mut self) -> Outcome {
        info!("Loading tasks...");
        match self.load().await {
            Ok(tasks) => {
                info!("Loaded {} tasks.", tasks.len());
                self.last_id = tasks
                    .iter()
                    .filter_map(|task| task.id.parse::<i64>().ok())
                    .fold(self.last_id, i64::max);
                self.tasks = tasks;
                Outcome::Applied
            }
            Err(e) => {
                self.fail("Could not load the tasks.", &e);
                Outcome::Failed
            }
        }
    }

    async fn load(&self) -> Result<Vec<Task>, StorageError> {
        self.store.migrate().await?;
        self.store.list_all().await
    }

    /// Add a task with the given title at the top of the list. Blank input is
    /// ignored.
    ///
    pub async fn create(&mut self, title: &str) -> Outcome {
        if title.trim().is_empty() {
            debug!("Ignoring blank task title.");
            return Outcome::Ignored;
        }

        let task = Task::new(&self.next_id(), title);
        match self.store.insert(&task).await {
            Ok(()) => {
                info!("Created task {}.", task.id);
                self.tasks.insert(0, task);
                Outcome::Applied
            }
            Err(e) => {
                self.fail("Could not add the task.", &e);
                Outcome::Failed
            }
        }
    }

    /// Flip the completed flag of the task.
    ///
    pub async fn toggle(&mut self, id: &str) -> Outcome {
        let completed = match self.tasks.iter().find(|task| task.id == id) {
            Some(task) => !task.completed,
            None => {
                debug!("Ignoring toggle of unknown task {}.", id);
                return Outcome::Ignored;
            }
        };

        match self.store.update(id, completed).await {
            Ok(false) => {
                warn!("Task {} is no longer in the database, dropping it.", id);
                self.tasks.retain(|task| task.id != id);
                Outcome::Ignored
            }
            Ok(true) => {
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                    task.completed = completed;
                }
                let status = if completed { "done" } else { "pending" };
                info!("Marked task {} as {}.", id, status);
                Outcome::Applied
            }
            Err(e) => {
                self.fail("Could not update the task status.", &e);
                Outcome::Failed
            }
        }
    }

    /// Delete the task.
    ///
    pub async fn remove(&mut self, id: &str) -> Outcome {
        if !self.tasks.iter().any(|task| task.id == id) {
            debug!("Ignoring removal of unknown task {}.", id);
            return Outcome::Ignored;
        }

        match self.store.delete(id).await {
            Ok(_) => {
                self.tasks.retain(|task| task.id != id);
                info!("Deleted task {}.", id);
                Outcome::Applied
            }
            Err(e) => {
                self.fail("Could not delete the task.", &e);
                Outcome::Failed
            }
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed.
    ///
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    /// Millisecond timestamp, bumped past the last id handed out or loaded.
    /// Once numeric ids are exhausted, the timestamp gets the first unused
    /// suffix instead.
    ///
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        match self.last_id.checked_add(1) {
            Some(next) => {
                self.last_id = now.max(next);
                self.last_id.to_string()
            }
            None => {
                let mut suffix = self.tasks.len();
                loop {
                    let id = format!("{}-{}", now, suffix);
                    if self.get(&id).is_none() {
                        return id;
                    }
                    suffix += 1;
                }
            }
        }
    }

    fn fail(&self, message: &str, error: &StorageError) {
        error!("{} {}", message, error);
        notice::report(self.notices.as_ref(), Notice::error(message));
    }
}
