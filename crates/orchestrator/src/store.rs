//! In-memory active-task store (§4.6 "Creation": "Stored in an in-process
//! keyed map"; §5: "mutations hold an exclusive lock per task id. A
//! single-writer-per-task invariant is enforced"; §9: "make the store
//! pluggable behind the same interface so a durable backend can be
//! substituted").

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{Task, TaskStatus};

#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    #[error("no such task: {0}")]
    NotFound(String),
    #[error("task {0} is already running or rolling back")]
    AlreadyRunning(String),
}

pub type Result<T> = std::result::Result<T, TaskStoreError>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task);
    async fn get(&self, task_id: &str) -> Result<Task>;
    async fn update(&self, task: Task);
    /// Atomically checks that `task_id` isn't already `running`/
    /// `rolling_back` and, if not, transitions it to `running` (§4.6, §5
    /// concurrency guarantee). Returns the task as it stood just before the
    /// transition.
    async fn try_begin_run(&self, task_id: &str) -> Result<Task>;
}

/// Recovery semantics after a process restart are declared explicitly per
/// §9: in-flight tasks are not carried across restarts by this
/// implementation (there is nothing to recover from — the map starts
/// empty), which is the stated "safest default" from §9.
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    async fn get(&self, task_id: &str) -> Result<Task> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(task_id.to_string()))
    }

    async fn update(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    async fn try_begin_run(&self, task_id: &str) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(task_id.to_string()))?;

        if matches!(task.status, TaskStatus::Running | TaskStatus::RollingBack) {
            return Err(TaskStoreError::AlreadyRunning(task_id.to_string()));
        }

        let mut running = task.clone();
        running.status = TaskStatus::Running;
        tasks.insert(task_id.to_string(), running);
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StepStatus, TaskStep};

    fn sample_task() -> Task {
        Task {
            id: "t1".into(),
            user_id: "u1".into(),
            server_id: "s1".into(),
            title: "t".into(),
            description: "d".into(),
            status: TaskStatus::Pending,
            steps: vec![TaskStep {
                id: "s1".into(),
                name: "step".into(),
                description: "d".into(),
                command: "true".into(),
                rollback_command: None,
                requires_approval: false,
                timeout: 30,
                status: StepStatus::Pending,
                output: None,
                error: None,
                exit_code: None,
                started_at: None,
                completed_at: None,
            }],
            current_step_index: 0,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn try_begin_run_rejects_second_concurrent_attempt() {
        let store = InMemoryTaskStore::new();
        store.insert(sample_task()).await;

        store.try_begin_run("t1").await.unwrap();
        let second = store.try_begin_run("t1").await;
        assert!(matches!(second, Err(TaskStoreError::AlreadyRunning(_))));
    }

    #[tokio::test]
    async fn try_begin_run_on_unknown_task_errors() {
        let store = InMemoryTaskStore::new();
        assert!(matches!(store.try_begin_run("missing").await, Err(TaskStoreError::NotFound(_))));
    }
}
