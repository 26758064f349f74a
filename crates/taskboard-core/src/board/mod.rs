/*
[INPUT]:  A TaskStore implementation, user mutations from the presentation layer
[OUTPUT]: Optimistic task board with rollback, per-task ordering and change notifications
[POS]:    State layer - the single owner of the local task collection
[UPDATE]: When adding mutation entry points or changing reconciliation flow
*/

mod lanes;
mod notify;
mod pending;
mod snapshot;
mod state;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskboard_adapter::{CreateTaskRequest, Status, Task, TaskPatch, TaskStore};
use tracing::{debug, info, warn};

pub use notify::{Listener, Subscription};
pub use pending::{OpId, OpKind, Outcome, PendingOp, TaskKey};
pub use snapshot::{BoardSnapshot, Column, PendingSummary};

use crate::error::BoardError;
use lanes::Lanes;
use notify::Notifier;
use state::BoardState;

/// Lock a std mutex, recovering the data if a listener panicked while it was held
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<BoardState>,
    lanes: Lanes,
    notifier: Arc<Notifier>,
}

impl Shared {
    fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Run one state change and notify subscribers with the result
    fn transact<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let result = {
            let mut state = lock(&self.state);
            let result = f(&mut state);
            self.notifier.enqueue(state.snapshot());
            result
        };
        self.notifier.flush();
        result
    }

    /// Like `transact`, but a failure is also recorded as the board error for `task`
    fn try_transact<R>(
        &self,
        task: Option<&str>,
        f: impl FnOnce(&mut BoardState) -> Result<R, BoardError>,
    ) -> Result<R, BoardError> {
        self.transact(|state| f(&mut *state).inspect_err(|err| state.set_error(err.clone(), task)))
    }

    fn reject<R>(&self, task: Option<&str>, err: BoardError) -> Result<R, BoardError> {
        debug!(error = %err, "mutation rejected");
        self.try_transact(task, |_| Err(err))
    }
}

/// Settles its operation as cancelled if the request future is dropped first
struct InFlight<'a> {
    shared: &'a Shared,
    op: Option<OpId>,
}

impl<'a> InFlight<'a> {
    fn new(shared: &'a Shared, op: OpId) -> Self {
        Self {
            shared,
            op: Some(op),
        }
    }

    fn settle(mut self, outcome: Outcome) {
        if let Some(op) = self.op.take() {
            self.shared.transact(|state| state.settle(op, outcome));
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(op) = self.op.take() {
            warn!(op_id = op, "request dropped before completion, rolling back");
            self.shared.transact(|state| {
                state.settle(op, Err(BoardError::transport(None, "request cancelled")))
            });
        }
    }
}

/// Client-side task board.
///
/// Holds the local view of every task, applies mutations optimistically,
/// and reconciles them with the store's answer. Mutations on the same task
/// reach the store in call order; mutations on different tasks run
/// independently. Cloning shares the same board.
pub struct TaskBoard<S: TaskStore> {
    store: Arc<S>,
    shared: Arc<Shared>,
}

impl<S: TaskStore> Clone for TaskBoard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: TaskStore> fmt::Debug for TaskBoard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskBoard")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl<S: TaskStore> TaskBoard<S> {
    pub fn new(store: S) -> Self {
        Self::with_store(Arc::new(store))
    }

    pub fn with_store(store: Arc<S>) -> Self {
        Self {
            store,
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current view of the board
    pub fn snapshot(&self) -> BoardSnapshot {
        self.shared.read(BoardState::snapshot)
    }

    /// Register a listener for every collection or error-state change.
    ///
    /// Listeners run synchronously, in registration order, on the task that
    /// made the change. The listener is removed when the returned handle drops.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BoardSnapshot) + Send + Sync + 'static,
    {
        self.shared.notifier.register(Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.notifier.listener_count()
    }

    /// Clear the board error. Notifies only if there was one.
    pub fn dismiss_error(&self) {
        let cleared = {
            let mut state = lock(&self.shared.state);
            let cleared = state.clear_error();
            if cleared {
                self.shared.notifier.enqueue(state.snapshot());
            }
            cleared
        };
        if cleared {
            self.shared.notifier.flush();
        }
    }

    /// Replace the collection with the store's task list.
    ///
    /// A failure sets the page-level error and leaves the collection as it was.
    pub async fn load(&self) -> Result<(), BoardError> {
        debug!("loading board");
        match self.store.list().await.map_err(BoardError::from) {
            Ok(tasks) => {
                info!(count = tasks.len(), "board loaded");
                self.shared.transact(|state| state.replace_all(tasks));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "board load failed");
                self.shared.transact(|state| state.fail_load(err.clone()));
                Err(err)
            }
        }
    }

    /// Create a task.
    ///
    /// The title is trimmed and must not be empty. Nothing is shown until
    /// the store assigns an id; the snapshot's `submitting()` counts requests in flight.
    pub async fn create_task(&self, req: CreateTaskRequest) -> Result<Task, BoardError> {
        let Some(title) = req.trimmed_title().map(str::to_string) else {
            return self.shared.reject(None, BoardError::validation("title is required"));
        };
        let req = CreateTaskRequest { title, ..req };

        let op = self.shared.transact(BoardState::begin_create);
        let in_flight = InFlight::new(&self.shared, op);
        debug!(op_id = op, title = %req.title, "creating task");

        let result = self.store.create(req).await.map_err(BoardError::from);
        match &result {
            Ok(task) => info!(task_id = %task.id, "task created"),
            Err(err) => warn!(error = %err, "task creation failed"),
        }
        in_flight.settle(result.clone().map(Some));
        result
    }

    /// Apply a partial update to a task in the collection
    pub async fn update_task(&self, id: &str, mut patch: TaskPatch) -> Result<Task, BoardError> {
        if let Some(title) = patch.title.as_deref() {
            let title = title.trim();
            if title.is_empty() {
                return self
                    .shared
                    .reject(Some(id), BoardError::validation("title must not be empty"));
            }
            patch.title = Some(title.to_string());
        }
        self.mutate(id, OpKind::Update, patch).await
    }

    /// Move a task to another column.
    ///
    /// Accepts a [`Status`] or a raw literal such as `"In Progress"`;
    /// anything outside the workflow fails with `InvalidStatus` here, at
    /// conversion. Every pair of columns is a legal move.
    pub async fn move_task<T>(&self, id: &str, target: T) -> Result<Task, BoardError>
    where
        T: TryInto<Status>,
        BoardError: From<T::Error>,
    {
        let status = match target.try_into() {
            Ok(status) => status,
            Err(err) => return self.shared.reject(Some(id), BoardError::from(err)),
        };
        self.mutate(id, OpKind::Move, TaskPatch::status(status)).await
    }

    /// Remove a task. It disappears at once and comes back if the store refuses.
    pub async fn delete_task(&self, id: &str) -> Result<(), BoardError> {
        let op = self
            .shared
            .try_transact(Some(id), |state| state.begin_delete(id))?;
        let in_flight = InFlight::new(&self.shared, op);
        debug!(op_id = op, task_id = %id, "task removed locally");

        let _lane = self.shared.lanes.acquire(id).await;
        let result = self.store.delete(id).await.map_err(BoardError::from);
        match &result {
            Ok(()) => info!(task_id = %id, "task deleted"),
            Err(err) => warn!(task_id = %id, error = %err, "task deletion failed"),
        }
        in_flight.settle(result.clone().map(|()| None));
        result
    }

    async fn mutate(&self, id: &str, kind: OpKind, patch: TaskPatch) -> Result<Task, BoardError> {
        if self.shared.read(|state| state.task(id).is_none()) {
            return self.shared.reject(Some(id), BoardError::not_found(id));
        }

        let _lane = self.shared.lanes.acquire(id).await;

        // Earlier mutations on this id have settled; decide against the current copy.
        let Some(current) = self.shared.read(|state| state.task(id).cloned()) else {
            return self.shared.reject(Some(id), BoardError::not_found(id));
        };
        let mut next = current.clone();
        next.apply(&patch);
        if next == current {
            debug!(task_id = %id, ?kind, "mutation changes nothing, skipping");
            return Ok(current);
        }

        let op = self
            .shared
            .try_transact(Some(id), |state| state.begin_update(id, kind, &patch))?;
        let in_flight = InFlight::new(&self.shared, op);
        debug!(op_id = op, task_id = %id, ?kind, "optimistic change applied");

        let result = match (kind, patch.status) {
            (OpKind::Move, Some(status)) => self.store.set_status(id, status).await,
            _ => self.store.update(id, &patch).await,
        }
        .map_err(BoardError::from);

        match &result {
            Ok(task) => info!(task_id = %task.id, ?kind, "change confirmed"),
            Err(err) => warn!(task_id = %id, ?kind, error = %err, "change failed, rolling back"),
        }
        in_flight.settle(result.clone().map(Some));
        result
    }
}
