use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of `created_at`, e.g. `2024-11-30 09:15`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

impl Task {
    /// A fresh, incomplete task stamped with the current local time.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.title.to_lowercase().contains(needle_lower)
    }

    /// Parsed creation time, `None` if the stored string was hand-edited into another shape.
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }
}

/// Identity of a task for the lifetime of the process. Never written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_incomplete() {
        let task = Task::new("Buy milk");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
    }

    #[test]
    fn test_new_task_timestamp_is_well_formed() {
        let task = Task::new("Buy milk");
        assert_eq!(task.created_at.len(), "YYYY-MM-DD HH:MM".len());
        assert!(task.created_at_time().is_some());
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let mut task = Task::new("X");
        task.toggle();
        assert!(task.completed);
        task.toggle();
        assert!(!task.completed);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let task = Task::new("Write Report");
        assert!(task.matches("write"));
        assert!(task.matches("port"));
        assert!(task.matches(""));
        assert!(!task.matches("tests"));
    }

    #[test]
    fn test_serialized_field_names() {
        let task = Task {
            title: "A".to_string(),
            completed: true,
            created_at: "2024-01-02 03:04".to_string(),
        };
        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["title"], "A");
        assert_eq!(obj["completed"], true);
        assert_eq!(obj["created_at"], "2024-01-02 03:04");
    }
}
