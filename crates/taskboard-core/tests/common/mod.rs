/*
[INPUT]:  Board test scenarios needing a controllable task store
[OUTPUT]: Scripted in-memory TaskStore with call log, queued failures and per-call gates
[POS]:    Test infrastructure - shared across board integration tests
[UPDATE]: When the TaskStore contract changes or tests need new controls
*/

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskboard_adapter::{
    CreateTaskRequest, Status, Task, TaskPatch, TaskStore, TaskboardError,
};
use taskboard_core::{BoardSnapshot, Subscription, TaskBoard};
use tokio::sync::oneshot;
use wiremock::MockServer;

/// One request as the store received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    List,
    Update(String, TaskPatch),
    SetStatus(String, Status),
    Delete(String),
}

/// Keeps the call it was handed out for suspended until released or dropped
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// In-memory task store that behaves like the server and can be scripted
#[derive(Default)]
pub struct ScriptedStore {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<TaskboardError>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    next_id: AtomicU64,
}

impl ScriptedStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::default();
        *store.tasks.lock().unwrap() = tasks;
        store.next_id.store(100, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the initial listing
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::List)
            .collect()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    /// The next call fails with `err`
    pub fn fail_next(&self, err: TaskboardError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// The next call waits for the returned gate
    pub fn hold_next(&self) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        Gate(tx)
    }

    async fn enter(&self, call: Call) -> Result<(), TaskboardError> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().pop_front();
        let failure = self.failures.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskboardError> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskboardError::NotFound { id: id.to_string() })?;
        task.apply(patch);
        Ok(task.clone())
    }
}

#[async_trait]
impl TaskStore for ScriptedStore {
    async fn create(&self, req: CreateTaskRequest) -> Result<Task, TaskboardError> {
        self.enter(Call::Create(req.title.clone())).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task = Task::new(format!("TASK-{n:03}"), req.title)
            .with_description(req.description)
            .with_status(req.status)
            .with_priority(req.priority);
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, TaskboardError> {
        self.enter(Call::List).await?;
        Ok(self.tasks())
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskboardError> {
        self.enter(Call::Update(id.to_string(), patch.clone())).await?;
        self.patch(id, patch)
    }

    async fn set_status(&self, id: &str, status: Status) -> Result<Task, TaskboardError> {
        self.enter(Call::SetStatus(id.to_string(), status)).await?;
        self.patch(id, &TaskPatch::status(status))
    }

    async fn delete(&self, id: &str) -> Result<(), TaskboardError> {
        self.enter(Call::Delete(id.to_string())).await?;
        let mut tasks = self.tasks.lock().unwrap();
        let position = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| TaskboardError::NotFound { id: id.to_string() })?;
        tasks.remove(position);
        Ok(())
    }
}

pub fn server_error(status: u16) -> TaskboardError {
    TaskboardError::Api {
        status,
        message: format!("status {status}"),
    }
}

/// Board over a scripted store holding `tasks`, already loaded
pub async fn loaded_board(tasks: Vec<Task>) -> (TaskBoard<ScriptedStore>, Arc<ScriptedStore>) {
    let store = Arc::new(ScriptedStore::with_tasks(tasks));
    let board = TaskBoard::with_store(Arc::clone(&store));
    board.load().await.expect("initial load");
    (board, store)
}

/// Yield until `store` has received `count` mutation calls
pub async fn wait_for_mutations(store: &ScriptedStore, count: usize) {
    for _ in 0..1000 {
        if store.mutations().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "store saw {} mutations, expected {count}",
        store.mutations().len()
    );
}

pub async fn settle_spawned() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// Record every snapshot delivered to a listener
pub fn record<S: TaskStore + 'static>(
    board: &TaskBoard<S>,
) -> (Arc<Mutex<Vec<BoardSnapshot>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscription = {
        let seen = Arc::clone(&seen);
        board.subscribe(move |snapshot| seen.lock().unwrap().push(snapshot.clone()))
    };
    (seen, subscription)
}

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// JSON body of a task as the server returns it
pub fn task_json(id: &str, title: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": "Medium",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}
