/*
[INPUT]:  BoardState at the moment of a change
[OUTPUT]: Immutable board view handed to subscribers, grouped by column on demand
[POS]:    State layer - presentation-facing read model
[UPDATE]: When subscribers need new derived views of the board
*/

use taskboard_adapter::{Status, Task};

use crate::board::pending::{OpKind, TaskKey};
use crate::classify::PageError;
use crate::error::BoardError;
use crate::workflow::TaskWorkflow;

/// In-flight mutation as seen by presentation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSummary {
    pub target: TaskKey,
    pub kind: OpKind,
}

/// One board column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// Copy of the board taken right after a change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Tasks in collection order
    pub tasks: Vec<Task>,
    /// Error from the most recent failed action, if not yet cleared.
    ///
    /// Cleared by the next mutation of the same task, a successful load, or
    /// `dismiss_error`; other tasks' mutations leave it alone.
    pub error: Option<BoardError>,
    /// Task the error belongs to; `None` for failed creates and loads
    pub error_task: Option<String>,
    /// Full-page error from a failed load
    pub page_error: Option<PageError>,
    pub pending: Vec<PendingSummary>,
    /// Bumped on every change to `tasks`, and only then
    pub revision: u64,
    /// True once a load has succeeded
    pub loaded: bool,
}

impl BoardSnapshot {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Tasks grouped by status, one column per workflow state, collection order within a column
    pub fn columns(&self) -> Vec<Column<'_>> {
        let mut columns: Vec<Column<'_>> = TaskWorkflow::states()
            .iter()
            .map(|&status| Column {
                status,
                tasks: Vec::new(),
            })
            .collect();

        for task in &self.tasks {
            columns[TaskWorkflow::column_index(task.status)].tasks.push(task);
        }
        columns
    }

    /// Tasks in one column
    pub fn column(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    /// True while a mutation on `id` is in flight
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending
            .iter()
            .any(|op| matches!(&op.target, TaskKey::Persisted(target) if target == id))
    }

    /// Number of create requests awaiting the server
    pub fn submitting(&self) -> usize {
        self.pending
            .iter()
            .filter(|op| op.kind == OpKind::Create)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
