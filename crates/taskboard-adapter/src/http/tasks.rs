/*
[INPUT]:  Task create/update requests and task ids
[OUTPUT]: Server-confirmed tasks or typed errors
[POS]:    HTTP layer - /task CRUD endpoints
[UPDATE]: When adding task endpoints or changing status-code mapping
*/

use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::http::{Result, TaskboardClient, TaskboardError};
use crate::types::{CreateTaskRequest, Status, Task, TaskPatch, TaskRecord};

impl TaskboardClient {
    /// Create a task
    ///
    /// POST /task
    pub async fn create_task(&self, req: CreateTaskRequest) -> Result<Task> {
        let title = req
            .trimmed_title()
            .ok_or_else(|| TaskboardError::Validation {
                message: "title is required".to_string(),
            })?
            .to_string();
        let req = CreateTaskRequest { title, ..req };

        debug!(title = %req.title, status = %req.status, "creating task");
        let builder = self.task_request(Method::POST, None)?.json(&req);
        let record: TaskRecord = self
            .send_json(builder)
            .await
            .map_err(|err| for_request(err, None))?;
        Task::try_from(record)
    }

    /// List every task
    ///
    /// GET /task
    ///
    /// Records with a status or priority outside the known sets are skipped.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.task_request(Method::GET, None)?;
        let records: Option<Vec<TaskRecord>> = self.send_json(builder).await?;

        let mut tasks = Vec::new();
        for record in records.unwrap_or_default() {
            let id = record.id.clone();
            match Task::try_from(record) {
                Ok(task) => tasks.push(task),
                Err(err) => warn!(task_id = %id, error = %err, "skipping malformed task record"),
            }
        }

        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Apply a partial update
    ///
    /// PUT /task/{id}
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(TaskboardError::Validation {
                    message: "title cannot be empty or whitespace only".to_string(),
                });
            }
        }

        debug!(task_id = %id, "updating task");
        let builder = self.task_request(Method::PUT, Some(id))?.json(patch);
        let record: TaskRecord = self
            .send_json(builder)
            .await
            .map_err(|err| for_request(err, Some(id)))?;
        Task::try_from(record)
    }

    /// Move a task to another status
    ///
    /// PUT /task/{id} with a status-only body
    pub async fn set_task_status(&self, id: &str, status: Status) -> Result<Task> {
        self.update_task(id, &TaskPatch::status(status)).await
    }

    /// Delete a task
    ///
    /// DELETE /task/{id}
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        debug!(task_id = %id, "deleting task");
        let builder = self.task_request(Method::DELETE, Some(id))?;
        self.send_empty(builder)
            .await
            .map_err(|err| for_request(err, Some(id)))
    }
}

/// Map the statuses the task API uses for input and identity errors
fn for_request(err: TaskboardError, id: Option<&str>) -> TaskboardError {
    match err {
        TaskboardError::Api { status, message } if status == StatusCode::BAD_REQUEST.as_u16() => {
            TaskboardError::Validation { message }
        }
        TaskboardError::Api { status, message } if status == StatusCode::NOT_FOUND.as_u16() => {
            match id {
                Some(id) => TaskboardError::NotFound { id: id.to_string() },
                None => TaskboardError::Api { status, message },
            }
        }
        other => other,
    }
}
