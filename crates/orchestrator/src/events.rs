//! Task event bus (§4.6, GLOSSARY "Task event bus"): an in-process
//! publish/subscribe channel. §9's "Cyclic references" note is addressed by
//! keeping this module free of any dependency back on `Orchestrator` — both
//! sides import it, neither owns the other.

use tokio::sync::broadcast;

use crate::types::{Task, TaskStep};

#[derive(Debug, Clone)]
pub enum TaskEvent {
    TaskCreated(Task),
    TaskUpdated(Task),
    StepStarted { task_id: String, step: TaskStep },
    StepCompleted { task_id: String, step: TaskStep },
    StepFailed { task_id: String, step: TaskStep },
    TaskNeedsApproval { task: Task, step: TaskStep },
    TaskCompleted(Task),
    TaskFailed(Task),
    StepRollingBack { task_id: String, step: TaskStep },
    StepRolledBack { task_id: String, step: TaskStep },
    StepRollbackFailed { task_id: String, step: TaskStep },
    TaskRolledBack(Task),
    TaskCancelled(Task),
    TaskPaused(Task),
    StepApproved { task_id: String, step: TaskStep },
}

impl TaskEvent {
    /// The task id this event concerns, for the execution endpoint's
    /// per-`taskId` SSE filtering (§4.6).
    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            TaskEvent::TaskCreated(t)
            | TaskEvent::TaskUpdated(t)
            | TaskEvent::TaskCompleted(t)
            | TaskEvent::TaskFailed(t)
            | TaskEvent::TaskRolledBack(t)
            | TaskEvent::TaskCancelled(t)
            | TaskEvent::TaskPaused(t) => &t.id,
            TaskEvent::StepStarted { task_id, .. }
            | TaskEvent::StepCompleted { task_id, .. }
            | TaskEvent::StepFailed { task_id, .. }
            | TaskEvent::StepRollingBack { task_id, .. }
            | TaskEvent::StepRolledBack { task_id, .. }
            | TaskEvent::StepRollbackFailed { task_id, .. }
            | TaskEvent::StepApproved { task_id, .. } => task_id,
            TaskEvent::TaskNeedsApproval { task, .. } => &task.id,
        }
    }
}

/// Topic-keyed event bus. Subscribers receive every event and filter by
/// `task_id()` themselves (§4.6: "relays them as SSE messages filtered by
/// `taskId`").
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TaskEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn publish(&self, event: TaskEvent) {
        // No subscribers is not an error — events fire regardless of
        // whether anyone's listening (§4.6).
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StepStatus, TaskStatus};

    fn sample_task() -> Task {
        Task {
            id: "t1".into(),
            user_id: "u1".into(),
            server_id: "s1".into(),
            title: "test".into(),
            description: "test".into(),
            status: TaskStatus::Pending,
            steps: vec![],
            current_step_index: 0,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_events_filtered_by_task_id() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(TaskEvent::TaskCreated(sample_task()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.task_id(), "t1");
    }

    #[test]
    fn step_status_default_variants_compile() {
        let _ = StepStatus::Pending;
    }
}
