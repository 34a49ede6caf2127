//! §3 data model for `Task`/`TaskStep` — owned by the orchestrator rather
//! than the Store Port, per §9: tasks live in a process-local map, not the
//! relational store the rest of the core treats as opaque.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Planning,
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    RollingBack,
    RolledBack,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    RolledBack,
    RollbackFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStep {
    pub id: String,
    pub name: String,
    pub description: String,
    pub command: String,
    pub rollback_command: Option<String>,
    pub requires_approval: bool,
    /// Seconds; clamped into `vps_ssh`'s `[1, 300]` bound at execution time.
    pub timeout: u64,
    pub status: StepStatus,
    pub output: Option<String>,
    pub error: Option<String>,
    pub exit_code: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub server_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub steps: Vec<TaskStep>,
    /// Index of the next step to attempt; monotonically non-decreasing
    /// during a single run (§3 invariant).
    pub current_step_index: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// A step the LLM proposed during planning (§4.6 `planTask`), before ids
/// are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedStep {
    pub name: String,
    pub description: String,
    pub command: String,
    #[serde(default)]
    pub rollback_command: Option<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default = "default_step_timeout")]
    pub timeout: u64,
}

fn default_step_timeout() -> u64 {
    60
}

/// The structured plan the LLM emits (§4.6 `planTask`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    pub description: String,
    pub steps: Vec<PlannedStep>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub requires_approval: bool,
}

impl Task {
    #[must_use]
    pub fn from_plan(user_id: impl Into<String>, server_id: impl Into<String>, plan: Plan) -> Self {
        let steps = plan
            .steps
            .into_iter()
            .map(|s| TaskStep {
                id: vps_common::new_id(),
                name: s.name,
                description: s.description,
                command: s.command,
                rollback_command: s.rollback_command,
                requires_approval: s.requires_approval,
                timeout: s.timeout,
                status: StepStatus::Pending,
                output: None,
                error: None,
                exit_code: None,
                started_at: None,
                completed_at: None,
            })
            .collect();

        Self {
            id: vps_common::new_id(),
            user_id: user_id.into(),
            server_id: server_id.into(),
            title: plan.title,
            description: plan.description,
            status: TaskStatus::Pending,
            steps,
            current_step_index: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }
}
