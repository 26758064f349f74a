/*
[INPUT]:  Task mutations issued by the board
[OUTPUT]: Async CRUD contract over a remote task store
[POS]:    Seam between the state manager and the transport
[UPDATE]: When the store contract gains or changes an operation
*/

use async_trait::async_trait;

use crate::http::{Result, TaskboardClient};
use crate::types::{CreateTaskRequest, Status, Task, TaskPatch};

/// Remote task store.
///
/// Implementations never retry; each call maps to exactly one request.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task; the store assigns its id.
    async fn create(&self, req: CreateTaskRequest) -> Result<Task>;

    /// Every task currently held by the store.
    async fn list(&self) -> Result<Vec<Task>>;

    /// Apply a partial update and return the stored representation.
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task>;

    /// Status-only update.
    async fn set_status(&self, id: &str, status: Status) -> Result<Task> {
        self.update(id, &TaskPatch::status(status)).await
    }

    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl TaskStore for TaskboardClient {
    async fn create(&self, req: CreateTaskRequest) -> Result<Task> {
        self.create_task(req).await
    }

    async fn list(&self) -> Result<Vec<Task>> {
        self.list_tasks().await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.update_task(id, patch).await
    }

    async fn set_status(&self, id: &str, status: Status) -> Result<Task> {
        self.set_task_status(id, status).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_task(id).await
    }
}
