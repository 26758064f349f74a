/*
[INPUT]:  Error sources (HTTP, API status, serialization, validation)
[OUTPUT]: Structured error types with status code and retry hints
[POS]:    Error handling layer - unified error types for the adapter crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the task API adapter
#[derive(Error, Debug)]
pub enum TaskboardError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The server does not know the task
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// Input rejected locally or by the server
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Status literal outside the workflow
    #[error("Invalid status: {value}")]
    InvalidStatus { value: String },

    /// Priority literal outside Low/Medium/High
    #[error("Invalid priority: {value}")]
    InvalidPriority { value: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaskboardError {
    /// HTTP status code attached to the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TaskboardError::Api { status, .. } => Some(*status),
            TaskboardError::Http(err) => err.status().map(|s| s.as_u16()),
            TaskboardError::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }

    /// Check if the request timed out in transit
    pub fn is_timeout(&self) -> bool {
        match self {
            TaskboardError::Http(err) => err.is_timeout(),
            TaskboardError::Api { status, .. } => {
                *status == StatusCode::GATEWAY_TIMEOUT.as_u16()
                    || *status == StatusCode::REQUEST_TIMEOUT.as_u16()
            }
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TaskboardError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, TaskboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = TaskboardError::api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.status_code(), Some(500));
        assert!(!err.is_timeout());

        let err = TaskboardError::Validation {
            message: "title is required".to_string(),
        };
        assert_eq!(err.status_code(), None);
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_api_error_creation() {
        let err = TaskboardError::api_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            TaskboardError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            _ => panic!("Expected Api error variant"),
        }
    }

    #[test]
    fn test_gateway_timeout_is_timeout() {
        let err = TaskboardError::api_error(StatusCode::GATEWAY_TIMEOUT, "slow");
        assert!(err.is_timeout());
    }
}
