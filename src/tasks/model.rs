use fake::Dummy;

/// Defines task data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Task {
    /// Return a new, not yet completed task.
    ///
    pub fn new(id: &str, title: &str) -> Self {
        Task {
            id: id.to_owned(),
            title: title.to_owned(),
            completed: false,
        }
    }
}
