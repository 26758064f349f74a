/*
[INPUT]:  Local validation failures and classified adapter errors
[OUTPUT]: BoardError, the typed failure delivered to board subscribers
[POS]:    Error handling layer - board-facing error taxonomy
[UPDATE]: When a new failure category becomes user visible
*/

use thiserror::Error;

use crate::classify::TransportBucket;

/// Failure surfaced by the board, both as a return value and in snapshots
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Bad user input; never sent to the network
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The task is absent locally or unknown to the server
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// Status value outside the workflow
    #[error("Invalid status: {value}")]
    InvalidStatus { value: String },

    /// Network failure or non-2xx response
    #[error("Transport error{}: {message}", status_suffix(.status_code))]
    Transport {
        status_code: Option<u16>,
        bucket: TransportBucket,
        message: String,
    },
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (status {code})"))
        .unwrap_or_default()
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        BoardError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        BoardError::NotFound { id: id.into() }
    }

    /// Transport failure with the bucket derived from the status code
    pub fn transport(status_code: Option<u16>, message: impl Into<String>) -> Self {
        BoardError::Transport {
            status_code,
            bucket: TransportBucket::from_status(status_code),
            message: message.into(),
        }
    }

    /// HTTP status code, for transport failures that carry one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BoardError::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BoardError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = BoardError::transport(Some(500), "failed to update task");
        assert_eq!(err.to_string(), "Transport error (status 500): failed to update task");

        let err = BoardError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_status_code_only_on_transport() {
        assert_eq!(BoardError::transport(Some(503), "busy").status_code(), Some(503));
        assert_eq!(BoardError::not_found("TASK-001").status_code(), None);
    }
}
