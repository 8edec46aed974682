//! Task record type for the to-do list.

use serde::{Deserialize, Serialize};

/// Format used when rendering a task's creation time for listings.
const DISPLAY_DATE_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// A single to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier assigned by the store on insertion.
    pub id: i64,
    /// RFC 3339 timestamp recorded when the task was added.
    pub date: String,
    /// Display name of the owning user.
    pub user: String,
    /// Free-text description of the task.
    pub task: String,
    /// Whether the task has been marked complete.
    pub completed: bool,
}

impl Task {
    /// Render the creation timestamp as e.g. `03 Aug 2026, 09:15 PM`.
    ///
    /// Falls back to the stored string when it does not parse as RFC 3339.
    #[must_use]
    pub fn display_date(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.date).map_or_else(
            |_| self.date.clone(),
            |date| date.format(DISPLAY_DATE_FORMAT).to_string(),
        )
    }
}
