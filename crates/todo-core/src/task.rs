//! The `Task` record.

use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// `id` is assigned by the store on insert; a value supplied by a client on
/// create is ignored. Both timestamps are epoch milliseconds and are not
/// range-checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-generated primary key.
    #[serde(default)]
    pub id: i64,
    /// When the task was added (epoch millis).
    pub added_on: i64,
    /// When the task is due (epoch millis).
    pub due_by: i64,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Free-form status label, e.g. `"open"` or `"done"`.
    pub status: String,
}

impl Task {
    /// Build a task that has not been persisted yet (`id == 0`).
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: impl Into<String>,
        added_on: i64,
        due_by: i64,
    ) -> Self {
        Self {
            id: 0,
            added_on,
            due_by,
            title: title.into(),
            description: description.into(),
            status: status.into(),
        }
    }

    /// Return a copy of this task carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}
