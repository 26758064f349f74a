/*
[INPUT]:  Public API exports for taskboard-core crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod board;
pub mod classify;
pub mod config;
pub mod error;
pub mod workflow;

// Re-export main types for convenience
pub use board::{BoardSnapshot, Column, OpKind, Subscription, TaskBoard, TaskKey};
pub use classify::{ErrorMessage, PageError, TransportBucket, classify, page_message};
pub use config::BoardConfig;
pub use error::BoardError;
pub use workflow::{TaskWorkflow, Transition};
