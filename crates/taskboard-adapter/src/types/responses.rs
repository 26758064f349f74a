/*
[INPUT]:  Raw JSON bodies returned by the task API
[OUTPUT]: Loosely typed records validated into Task, error payloads
[POS]:    Data layer - response types and validation
[UPDATE]: When response schema or error payload format changes
*/

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Priority, Status};
use super::models::Task;
use crate::http::TaskboardError;

/// Task exactly as it comes off the wire, before status and priority are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskboardError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err(TaskboardError::InvalidResponse(
                "task record without id".to_string(),
            ));
        }
        if record.title.trim().is_empty() {
            return Err(TaskboardError::InvalidResponse(format!(
                "task {} has an empty title",
                record.id
            )));
        }

        let status: Status = record.status.parse()?;
        let priority = if record.priority.is_empty() {
            Priority::default()
        } else {
            record.priority.parse()?
        };

        Ok(Task {
            id: record.id,
            title: record.title,
            description: record.description,
            status,
            priority,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Error payload of a non-2xx response.
///
/// The server writes `{"error": ...}`; other deployments use `{"message": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl ErrorBody {
    /// Human-readable message, including field details when present.
    pub fn summary(&self) -> Option<String> {
        let base = self
            .message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())?;

        if self.details.is_empty() {
            return Some(base.to_string());
        }

        let details = self
            .details
            .iter()
            .map(|(field, reason)| format!("{field}: {reason}"))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("{base} ({details})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, priority: &str) -> TaskRecord {
        TaskRecord {
            id: "TASK-001".to_string(),
            title: "Buy milk".to_string(),
            description: String::new(),
            status: status.to_string(),
            priority: priority.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_record_into_task() {
        let task = Task::try_from(record("In Progress", "High")).unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_record_with_unknown_status() {
        let err = Task::try_from(record("Completed", "Low")).unwrap_err();
        assert!(matches!(err, TaskboardError::InvalidStatus { value } if value == "Completed"));
    }

    #[test]
    fn test_record_without_priority_defaults_to_medium() {
        let task = Task::try_from(record("TODO", "")).unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_record_without_id_is_invalid() {
        let mut raw = record("TODO", "Low");
        raw.id.clear();
        assert!(matches!(
            Task::try_from(raw),
            Err(TaskboardError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_body_summary() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"validation failed","details":{"title":"title is required"}}"#,
        )
        .unwrap();
        assert_eq!(
            body.summary().as_deref(),
            Some("validation failed (title: title is required)")
        );

        let body: ErrorBody = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        assert_eq!(body.summary().as_deref(), Some("boom"));

        assert_eq!(ErrorBody::default().summary(), None);
    }
}
