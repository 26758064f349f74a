/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public task API adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod store;
pub mod types;

// Re-export commonly used types from http
pub use http::{ClientConfig, DEFAULT_BASE_URL, Result, TaskboardClient, TaskboardError};

pub use store::TaskStore;

// Re-export all types
pub use types::*;
