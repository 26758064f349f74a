/*
[INPUT]:  Task API schema literals for status and priority
[OUTPUT]: Typed Rust enums with serialization and string parsing
[POS]:    Data layer - closed value sets shared by client and board
[UPDATE]: When the server adds or renames a status or priority literal
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http::TaskboardError;

/// Workflow status of a task. Each status is exactly one board column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// Every status, in column order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Literal used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(Status::Todo),
            "In Progress" | "InProgress" => Ok(Status::InProgress),
            "Done" => Ok(Status::Done),
            other => Err(TaskboardError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = TaskboardError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Status {
    type Error = TaskboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(TaskboardError::InvalidPriority {
                value: other.to_string(),
            }),
        }
    }
}
