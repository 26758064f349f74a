/*
[INPUT]:  Mutations started by the board
[OUTPUT]: Pending operation records holding rollback snapshots
[POS]:    State layer - bookkeeping for in-flight mutations
[UPDATE]: When a new mutation kind is added to the board
*/

use std::fmt;

use taskboard_adapter::Task;
use uuid::Uuid;

use crate::error::BoardError;

/// Identifier of a pending operation, unique for the board's lifetime
pub type OpId = u64;

/// Task targeted by a pending operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Server-assigned id
    Persisted(String),
    /// Placeholder for a task the server has not created yet
    Temporary(Uuid),
}

impl TaskKey {
    pub fn temporary() -> Self {
        TaskKey::Temporary(Uuid::new_v4())
    }

    pub fn persisted_id(&self) -> Option<&str> {
        match self {
            TaskKey::Persisted(id) => Some(id),
            TaskKey::Temporary(_) => None,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::Persisted(id) => f.write_str(id),
            TaskKey::Temporary(uuid) => write!(f, "tmp-{uuid}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Create,
    Update,
    Move,
    Delete,
}

/// One in-flight mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub kind: OpKind,
    pub target: TaskKey,
    /// Task before the optimistic change; `None` for creates
    pub snapshot: Option<Task>,
    /// Index the task held in the collection when the operation started
    pub position: usize,
}

/// How the store answered a pending operation.
///
/// `Ok(Some(task))` carries the server representation, `Ok(None)` a bodiless confirmation.
pub type Outcome = Result<Option<Task>, BoardError>;
