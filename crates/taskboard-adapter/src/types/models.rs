/*
[INPUT]:  Validated task records from the task API
[OUTPUT]: Task domain model used by client and board
[POS]:    Data layer - core task entity
[UPDATE]: When task fields change on the server
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Priority, Status};
use super::requests::TaskPatch;

/// A task as confirmed by the server.
///
/// `id` and `title` are never empty for values produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: Status::default(),
            priority: Priority::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Apply the fields present in `patch` to this task.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut task = Task::new("TASK-001", "Buy milk")
            .with_description("2 litres")
            .with_priority(Priority::Low);

        task.apply(&TaskPatch::default().with_title("Buy oat milk"));

        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.description, "2 litres");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn test_deserialize_go_zero_timestamps() {
        let json = r#"{
            "id": "TASK-001",
            "title": "Buy milk",
            "description": "",
            "status": "Done",
            "priority": "High",
            "created_at": "0001-01-01T00:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::Done);
        assert!(task.created_at.is_some());
    }
}
