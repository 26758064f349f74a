/*
[INPUT]:  Fetched task lists, optimistic mutations, store outcomes
[OUTPUT]: Canonical task collection plus pending operations and error state
[POS]:    State layer - synchronous core of the board, no I/O
[UPDATE]: When reconciliation or rollback rules change
*/

use std::collections::{BTreeMap, HashSet};

use taskboard_adapter::{Task, TaskPatch};
use tracing::debug;

use crate::board::pending::{OpId, OpKind, Outcome, PendingOp, TaskKey};
use crate::board::snapshot::{BoardSnapshot, PendingSummary};
use crate::classify::PageError;
use crate::error::BoardError;

/// Task collection and everything needed to reconcile it.
///
/// Every method runs to completion under the board lock, so no two
/// mutations interleave partially.
#[derive(Debug, Default)]
pub(crate) struct BoardState {
    tasks: Vec<Task>,
    pending: BTreeMap<OpId, PendingOp>,
    next_op: OpId,
    error: Option<BoardError>,
    /// Task whose mutation raised `error`; `None` for creates and loads
    error_task: Option<String>,
    page_error: Option<PageError>,
    revision: u64,
    loaded: bool,
}

impl BoardState {
    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub(crate) fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn set_error(&mut self, err: BoardError, task: Option<&str>) {
        self.error = Some(err);
        self.error_task = task.map(str::to_string);
    }

    pub(crate) fn clear_error(&mut self) -> bool {
        self.error_task = None;
        self.error.take().is_some()
    }

    /// Drop the current error only if it belongs to `task`
    fn clear_error_for(&mut self, task: Option<&str>) {
        if self.error_task.as_deref() == task {
            self.error = None;
            self.error_task = None;
        }
    }

    fn register(&mut self, op: PendingOp) -> OpId {
        self.next_op += 1;
        let id = self.next_op;
        self.pending.insert(id, op);
        id
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn pending_delete_mut(&mut self, id: &str) -> Option<&mut PendingOp> {
        self.pending
            .values_mut()
            .find(|op| op.kind == OpKind::Delete && op.target.persisted_id() == Some(id))
    }

    fn has_pending(&self, id: &str, kinds: &[OpKind]) -> bool {
        self.pending
            .values()
            .any(|op| kinds.contains(&op.kind) && op.target.persisted_id() == Some(id))
    }

    /// Start a create. Nothing is inserted until the server assigns an id.
    pub(crate) fn begin_create(&mut self) -> OpId {
        self.clear_error_for(None);
        let position = self.tasks.len();
        self.register(PendingOp {
            kind: OpKind::Create,
            target: TaskKey::temporary(),
            snapshot: None,
            position,
        })
    }

    /// Apply `patch` to the local copy and remember the previous version
    pub(crate) fn begin_update(
        &mut self,
        id: &str,
        kind: OpKind,
        patch: &TaskPatch,
    ) -> Result<OpId, BoardError> {
        let position = self.position(id).ok_or_else(|| BoardError::not_found(id))?;
        let snapshot = self.tasks[position].clone();
        self.tasks[position].apply(patch);
        self.clear_error_for(Some(id));
        self.touch();

        Ok(self.register(PendingOp {
            kind,
            target: TaskKey::Persisted(id.to_string()),
            snapshot: Some(snapshot),
            position,
        }))
    }

    /// Remove the task right away, keeping it for a possible rollback
    pub(crate) fn begin_delete(&mut self, id: &str) -> Result<OpId, BoardError> {
        let position = self.position(id).ok_or_else(|| BoardError::not_found(id))?;
        let snapshot = self.tasks.remove(position);
        self.clear_error_for(Some(id));
        self.touch();

        Ok(self.register(PendingOp {
            kind: OpKind::Delete,
            target: TaskKey::Persisted(id.to_string()),
            snapshot: Some(snapshot),
            position,
        }))
    }

    /// Retire a pending operation: confirm it against the server answer or roll it back.
    ///
    /// Shared by every mutation kind. Returns false when `op_id` was already settled.
    pub(crate) fn settle(&mut self, op_id: OpId, outcome: Outcome) -> bool {
        let Some(op) = self.pending.remove(&op_id) else {
            return false;
        };

        let source = op.target.persisted_id().map(str::to_string);
        let source = source.as_deref();

        match (op.kind, outcome) {
            (OpKind::Create, Ok(Some(task))) => {
                self.upsert(task);
                self.clear_error_for(source);
            }
            (OpKind::Update | OpKind::Move, Ok(Some(task))) => {
                let id = source.unwrap_or_default();
                match self.position(id) {
                    Some(position) => {
                        self.tasks[position] = task;
                        self.touch();
                        self.clear_error_for(source);
                    }
                    None => {
                        // Deleted while in flight; keep the confirmed version for the delete's rollback.
                        debug!(task_id = %id, "discarding update response for deleted task");
                        if let Some(delete) = self.pending_delete_mut(id) {
                            delete.snapshot = Some(task);
                        }
                    }
                }
            }
            (OpKind::Delete, Ok(_)) | (OpKind::Create | OpKind::Update | OpKind::Move, Ok(None)) => {
                self.clear_error_for(source);
            }
            (OpKind::Create, Err(err)) => {
                self.set_error(err, source);
            }
            (OpKind::Update | OpKind::Move, Err(err)) => {
                let id = source.unwrap_or_default();
                match (self.position(id), op.snapshot) {
                    (Some(position), Some(snapshot)) => {
                        self.tasks[position] = snapshot;
                        self.touch();
                    }
                    (None, Some(snapshot)) => {
                        debug!(task_id = %id, "discarding update rollback for deleted task");
                        if let Some(delete) = self.pending_delete_mut(id) {
                            delete.snapshot = Some(snapshot);
                        }
                    }
                    (_, None) => {}
                }
                self.set_error(err, source);
            }
            (OpKind::Delete, Err(err)) => {
                if let Some(snapshot) = op.snapshot {
                    match self.position(&snapshot.id) {
                        Some(position) => self.tasks[position] = snapshot,
                        None => {
                            let position = op.position.min(self.tasks.len());
                            self.tasks.insert(position, snapshot);
                        }
                    }
                    self.touch();
                }
                self.set_error(err, source);
            }
        }
        true
    }

    fn upsert(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(position) => self.tasks[position] = task,
            None => self.tasks.push(task),
        }
        self.touch();
    }

    /// Replace the collection with a fresh listing.
    ///
    /// Tasks with an in-flight update keep their optimistic copy; tasks with
    /// a pending delete stay out.
    pub(crate) fn replace_all(&mut self, fetched: Vec<Task>) {
        let mut seen = HashSet::new();
        let mut next = Vec::with_capacity(fetched.len());

        for task in fetched {
            if !seen.insert(task.id.clone()) {
                continue;
            }
            if self.has_pending(&task.id, &[OpKind::Delete]) {
                continue;
            }
            if self.has_pending(&task.id, &[OpKind::Update, OpKind::Move]) {
                if let Some(local) = self.task(&task.id) {
                    next.push(local.clone());
                    continue;
                }
            }
            next.push(task);
        }

        self.tasks = next;
        self.loaded = true;
        self.page_error = None;
        self.clear_error();
        self.touch();
    }

    /// Record a failed load as the full-page error
    pub(crate) fn fail_load(&mut self, err: BoardError) {
        self.page_error = Some(PageError::from_error(&err));
        self.set_error(err, None);
    }

    pub(crate) fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tasks: self.tasks.clone(),
            error: self.error.clone(),
            error_task: self.error_task.clone(),
            page_error: self.page_error.clone(),
            pending: self
                .pending
                .values()
                .map(|op| PendingSummary {
                    target: op.target.clone(),
                    kind: op.kind,
                })
                .collect(),
            revision: self.revision,
            loaded: self.loaded,
        }
    }
}
