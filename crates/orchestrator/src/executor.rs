//! Task execution state machine (§4.6 `executeTask`/`approveStep`/
//! `rollbackTask`/pause/resume/cancel). Runs steps serially over the SSH
//! Executor, publishing lifecycle events as it goes.

use std::sync::Arc;

use chrono::Utc;
use vps_ssh::{Credential, ServerConnection};
use vps_store::types::AuthMethod;
use vps_store::Store;
use vps_vault::Vault;

use crate::error::{OrchestratorError, Result};
use crate::events::{EventBus, TaskEvent};
use crate::store::TaskStore;
use crate::types::{StepStatus, Task, TaskStatus, TaskStep};

pub struct Orchestrator {
    tasks: Arc<dyn TaskStore>,
    store: Arc<dyn Store>,
    vault: Arc<Vault>,
    events: EventBus,
}

impl Orchestrator {
    #[must_use]
    pub fn new(tasks: Arc<dyn TaskStore>, store: Arc<dyn Store>, vault: Arc<Vault>, events: EventBus) -> Self {
        Self { tasks, store, vault, events }
    }

    #[must_use]
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub async fn create_task(&self, task: Task) -> Task {
        self.tasks.insert(task.clone()).await;
        self.events.publish(TaskEvent::TaskCreated(task.clone()));
        task
    }

    /// §4.6 "Execution": drives steps forward from `current_step_index`
    /// until completion, a pause-for-approval, a failure, or an external
    /// pause/cancel is observed.
    pub async fn execute_task(&self, task_id: &str) -> Result<Task> {
        let mut task = self.tasks.try_begin_run(task_id).await?;
        task.status = TaskStatus::Running;
        if task.started_at.is_none() {
            task.started_at = Some(Utc::now());
        }
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskUpdated(task.clone()));

        let conn = match self.connection_for(&task).await {
            Ok(conn) => conn,
            Err(e) => return self.fail_task(task, e.to_string()).await,
        };

        let mut i = task.current_step_index;
        while i < task.steps.len() {
            // Observe external status transitions before touching the
            // remote host (§4.6: "Execution must not touch the remote
            // host" once paused/cancelled is observed).
            let latest = self.tasks.get(&task.id).await?;
            if matches!(latest.status, TaskStatus::Paused | TaskStatus::Cancelled) {
                return Ok(latest);
            }

            let step = task.steps[i].clone();

            if step.requires_approval && matches!(step.status, StepStatus::Pending) {
                task.current_step_index = i;
                task.status = TaskStatus::Paused;
                self.tasks.update(task.clone()).await;
                self.events.publish(TaskEvent::TaskNeedsApproval { task: task.clone(), step });
                return Ok(task);
            }

            task.steps[i].status = StepStatus::Running;
            task.steps[i].started_at = Some(Utc::now());
            self.tasks.update(task.clone()).await;
            self.events.publish(TaskEvent::StepStarted { task_id: task.id.clone(), step: task.steps[i].clone() });

            let outcome = vps_ssh::exec(&conn, &step.command, step.timeout).await;

            match outcome {
                Ok(result) if result.exit_code == 0 => {
                    task.steps[i].status = StepStatus::Completed;
                    task.steps[i].output = Some(result.merged_output());
                    task.steps[i].exit_code = Some(result.exit_code);
                    task.steps[i].completed_at = Some(Utc::now());
                    task.current_step_index = i + 1;
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepCompleted { task_id: task.id.clone(), step: task.steps[i].clone() });
                }
                Ok(result) => {
                    let error = format!("command exited with code {}", result.exit_code);
                    task.steps[i].status = StepStatus::Failed;
                    task.steps[i].output = Some(result.merged_output());
                    task.steps[i].exit_code = Some(result.exit_code);
                    task.steps[i].error = Some(error.clone());
                    task.steps[i].completed_at = Some(Utc::now());
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepFailed { task_id: task.id.clone(), step: task.steps[i].clone() });
                    return self.fail_task(task, error).await;
                }
                Err(e) => {
                    task.steps[i].status = StepStatus::Failed;
                    task.steps[i].error = Some(e.to_string());
                    task.steps[i].completed_at = Some(Utc::now());
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepFailed { task_id: task.id.clone(), step: task.steps[i].clone() });
                    return self.fail_task(task, e.to_string()).await;
                }
            }

            i += 1;
        }

        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskCompleted(task.clone()));
        Ok(task)
    }

    /// §4.6 `approveStep`: clears `requiresApproval` on the named step and
    /// re-enters `executeTask`.
    pub async fn approve_step(&self, task_id: &str, step_id: &str) -> Result<Task> {
        let mut task = self.tasks.get(task_id).await?;
        if let Some(step) = task.steps.iter_mut().find(|s| s.id == step_id) {
            step.requires_approval = false;
        }
        task.status = TaskStatus::Pending;
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::StepApproved {
            task_id: task.id.clone(),
            step: task.steps.iter().find(|s| s.id == step_id).cloned().unwrap_or_else(|| task.steps[task.current_step_index].clone()),
        });
        self.execute_task(task_id).await
    }

    /// §4.6 "Rollback": walks completed steps in reverse, running each
    /// step's `rollbackCommand` when present.
    pub async fn rollback_task(&self, task_id: &str) -> Result<Task> {
        let mut task = self.tasks.get(task_id).await?;
        task.status = TaskStatus::RollingBack;
        self.tasks.update(task.clone()).await;

        let conn = self.connection_for(&task).await?;

        let completed_indices: Vec<usize> = task
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.status, StepStatus::Completed))
            .map(|(idx, _)| idx)
            .collect();

        for idx in completed_indices.into_iter().rev() {
            let step = task.steps[idx].clone();
            self.events.publish(TaskEvent::StepRollingBack { task_id: task.id.clone(), step: step.clone() });

            let Some(rollback_command) = &step.rollback_command else {
                continue;
            };

            match vps_ssh::exec(&conn, rollback_command, step.timeout).await {
                Ok(result) if result.exit_code == 0 => {
                    task.steps[idx].status = StepStatus::RolledBack;
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepRolledBack { task_id: task.id.clone(), step: task.steps[idx].clone() });
                }
                Ok(result) => {
                    task.steps[idx].status = StepStatus::RollbackFailed;
                    task.steps[idx].error = Some(format!("rollback exited with code {}", result.exit_code));
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepRollbackFailed { task_id: task.id.clone(), step: task.steps[idx].clone() });
                }
                Err(e) => {
                    task.steps[idx].status = StepStatus::RollbackFailed;
                    task.steps[idx].error = Some(e.to_string());
                    self.tasks.update(task.clone()).await;
                    self.events.publish(TaskEvent::StepRollbackFailed { task_id: task.id.clone(), step: task.steps[idx].clone() });
                }
            }
        }

        task.status = TaskStatus::RolledBack;
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskRolledBack(task.clone()));
        Ok(task)
    }

    pub async fn pause_task(&self, task_id: &str) -> Result<Task> {
        let mut task = self.tasks.get(task_id).await?;
        task.status = TaskStatus::Paused;
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskPaused(task.clone()));
        Ok(task)
    }

    pub async fn resume_task(&self, task_id: &str) -> Result<Task> {
        let mut task = self.tasks.get(task_id).await?;
        task.status = TaskStatus::Pending;
        self.tasks.update(task.clone()).await;
        self.execute_task(task_id).await
    }

    /// §4.6 "cancel sets `cancelled` and marks all remaining `pending`
    /// steps as `skipped`".
    pub async fn cancel_task(&self, task_id: &str) -> Result<Task> {
        let mut task = self.tasks.get(task_id).await?;
        for step in &mut task.steps {
            if matches!(step.status, StepStatus::Pending) {
                step.status = StepStatus::Skipped;
            }
        }
        task.status = TaskStatus::Cancelled;
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskCancelled(task.clone()));
        Ok(task)
    }

    async fn fail_task(&self, mut task: Task, error: String) -> Result<Task> {
        task.status = TaskStatus::Failed;
        task.error = Some(error);
        self.tasks.update(task.clone()).await;
        self.events.publish(TaskEvent::TaskFailed(task.clone()));
        Ok(task)
    }

    async fn connection_for(&self, task: &Task) -> Result<ServerConnection> {
        let server = self
            .store
            .get_server(&task.server_id)
            .await
            .map_err(|e| OrchestratorError::NoServer(e.to_string()))?
            .ok_or_else(|| OrchestratorError::NoServer(task.server_id.clone()))?;

        let plaintext = self.vault.decrypt_credential(&server.encrypted_credential)?;
        let credential = match server.auth_method {
            AuthMethod::Password => Credential::Password(plaintext),
            AuthMethod::Key => Credential::PrivateKey { key: plaintext, passphrase: None },
        };
        Ok(ServerConnection::new(server.host, server.port, server.username, credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;
    use crate::types::{Plan, PlannedStep};
    use vps_store::types::{AuthMethod as SAuth, Server};
    use vps_store::InMemoryStore;
    use vps_vault::secret::{ApiKeySecret, EncryptionKeySecret, SessionSecret};

    fn orchestrator_with_server() -> (Orchestrator, Arc<dyn Store>, String) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let vault = Arc::new(
            Vault::new(&SessionSecret::new("s"), &ApiKeySecret::new("a"), &EncryptionKeySecret::new("e")).unwrap(),
        );
        let tasks: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let orchestrator = Orchestrator::new(tasks, store.clone(), vault.clone(), EventBus::new());
        (orchestrator, store, vault.encrypt_credential("pw").unwrap())
    }

    fn plan(steps: Vec<PlannedStep>) -> Plan {
        Plan {
            title: "t".into(),
            description: "d".into(),
            steps,
            estimated_duration: None,
            risks: vec![],
            requires_approval: false,
        }
    }

    fn step(name: &str, command: &str, requires_approval: bool) -> PlannedStep {
        PlannedStep {
            name: name.into(),
            description: name.into(),
            command: command.into(),
            rollback_command: None,
            requires_approval,
            timeout: 30,
        }
    }

    #[tokio::test]
    async fn double_execute_is_rejected_while_running() {
        let (orchestrator, _store, _ct) = orchestrator_with_server();
        let task = Task::from_plan("u1", "missing-server", plan(vec![step("a", "true", false)]));
        orchestrator.create_task(task.clone()).await;

        // first call will fail fast (no such server) but still transitions
        // through `running`; a concurrent second attempt while the first
        // holds the slot must be rejected.
        let tasks = orchestrator.tasks.clone();
        tasks.try_begin_run(&task.id).await.unwrap();
        let second = orchestrator.execute_task(&task.id).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn step_requiring_approval_pauses_without_touching_remote() {
        let (orchestrator, store, ct) = orchestrator_with_server();
        store
            .create_server(Server {
                id: "srv1".into(),
                user_id: "u1".into(),
                host: "198.51.100.1".into(),
                port: 22,
                username: "root".into(),
                auth_method: SAuth::Password,
                encrypted_credential: ct,
                last_connected_at: None,
            })
            .await
            .unwrap();

        let task = Task::from_plan("u1", "srv1", plan(vec![step("risky", "rm -rf /tmp/x", true)]));
        orchestrator.create_task(task.clone()).await;

        let result = orchestrator.execute_task(&task.id).await.unwrap();
        assert_eq!(result.status, TaskStatus::Paused);
        assert!(matches!(result.steps[0].status, StepStatus::Pending));
    }

    #[tokio::test]
    async fn cancel_marks_remaining_pending_steps_skipped() {
        let (orchestrator, _store, _ct) = orchestrator_with_server();
        let task = Task::from_plan("u1", "srv1", plan(vec![step("a", "true", false), step("b", "true", false)]));
        orchestrator.create_task(task.clone()).await;

        let cancelled = orchestrator.cancel_task(&task.id).await.unwrap();
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert!(cancelled.steps.iter().all(|s| matches!(s.status, StepStatus::Skipped)));
    }
}
