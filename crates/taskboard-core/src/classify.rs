/*
[INPUT]:  Adapter errors (HTTP, API status, validation) and board errors
[OUTPUT]: BoardError classification, transport buckets, friendly messages
[POS]:    Error classifier - failure taxonomy to user-facing presentation
[UPDATE]: When status-code buckets or user-facing copy change
*/

use std::convert::Infallible;

use taskboard_adapter::TaskboardError;

use crate::error::BoardError;

/// Presentation bucket for transport failures, used only to pick a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportBucket {
    Overloaded,
    Unavailable,
    TimedOut,
    Unknown,
}

impl TransportBucket {
    pub fn from_status(status_code: Option<u16>) -> Self {
        match status_code {
            Some(429 | 503) => TransportBucket::Overloaded,
            Some(502) => TransportBucket::Unavailable,
            Some(408 | 504) => TransportBucket::TimedOut,
            _ => TransportBucket::Unknown,
        }
    }
}

/// Title and subtitle shown for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessage {
    pub title: &'static str,
    pub subtitle: &'static str,
}

const INTERNAL_ERROR: ErrorMessage = ErrorMessage {
    title: "Oops! We dropped the ball!",
    subtitle: "Something went wrong on our end. We've made a note to fix this—thanks for your patience!",
};

const BAD_GATEWAY: ErrorMessage = ErrorMessage {
    title: "Our server is taking a quick break!",
    subtitle: "It'll be back in a jiffy. Feel free to grab a snack while you wait!",
};

const SERVICE_UNAVAILABLE: ErrorMessage = ErrorMessage {
    title: "So many people, so many tasks!",
    subtitle: "We're getting a lot of love right now. Hang tight and we'll be with you shortly!",
};

const GATEWAY_TIMEOUT: ErrorMessage = ErrorMessage {
    title: "This is taking longer than a Monday morning...",
    subtitle: "The request timed out. Give it another go—third time's the charm, right?",
};

const FALLBACK: ErrorMessage = ErrorMessage {
    title: "Well, that was unexpected!",
    subtitle: "Something went sideways. Don't worry, it's not you—it's us. We're on it!",
};

/// Friendly full-page message for a failed board load, keyed by HTTP status
pub fn page_message(status_code: Option<u16>) -> ErrorMessage {
    match status_code {
        Some(500) => INTERNAL_ERROR,
        Some(502) => BAD_GATEWAY,
        Some(503) => SERVICE_UNAVAILABLE,
        Some(504) => GATEWAY_TIMEOUT,
        _ => FALLBACK,
    }
}

/// Full-page error state left behind by a failed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub status_code: Option<u16>,
    pub message: ErrorMessage,
    /// Underlying failure, for logs and detail views
    pub detail: String,
}

impl PageError {
    pub fn from_error(err: &BoardError) -> Self {
        let status_code = err.status_code();
        Self {
            status_code,
            message: page_message(status_code),
            detail: err.to_string(),
        }
    }
}

/// Map an adapter failure onto the board taxonomy
pub fn classify(err: TaskboardError) -> BoardError {
    let status_code = err.status_code();
    let bucket = if err.is_timeout() {
        TransportBucket::TimedOut
    } else {
        TransportBucket::from_status(status_code)
    };

    match err {
        TaskboardError::Validation { message } => BoardError::Validation { message },
        TaskboardError::InvalidPriority { value } => {
            BoardError::validation(format!("priority must be one of: Low, Medium, High (got {value})"))
        }
        TaskboardError::NotFound { id } => BoardError::NotFound { id },
        TaskboardError::InvalidStatus { value } => BoardError::InvalidStatus { value },
        TaskboardError::Api { message, .. } => BoardError::Transport {
            status_code,
            bucket,
            message,
        },
        other @ (TaskboardError::Http(_)
        | TaskboardError::Serialization(_)
        | TaskboardError::UrlParse(_)
        | TaskboardError::InvalidResponse(_)
        | TaskboardError::Config(_)) => BoardError::Transport {
            status_code,
            bucket,
            message: other.to_string(),
        },
    }
}

impl From<TaskboardError> for BoardError {
    fn from(err: TaskboardError) -> Self {
        classify(err)
    }
}

impl From<Infallible> for BoardError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl BoardError {
    /// Presentation bucket, for transport failures
    pub fn transport_bucket(&self) -> Option<TransportBucket> {
        match self {
            BoardError::Transport { bucket, .. } => Some(*bucket),
            _ => None,
        }
    }

    /// Short inline message for a failed mutation
    pub fn user_message(&self) -> String {
        match self {
            BoardError::Validation { message } => message.clone(),
            BoardError::NotFound { .. } => "This task no longer exists.".to_string(),
            BoardError::InvalidStatus { value } => format!("\"{value}\" is not a board column."),
            BoardError::Transport { bucket, message, .. } => match bucket {
                TransportBucket::Overloaded => {
                    "The server is busy right now. Please try again shortly.".to_string()
                }
                TransportBucket::Unavailable => "The server is temporarily unavailable.".to_string(),
                TransportBucket::TimedOut => "The request timed out.".to_string(),
                TransportBucket::Unknown => format!("Something went wrong: {message}"),
            },
        }
    }
}
