//! `/api/agent/tasks*` (§6): planning, creation, execution (SSE), per-step
//! approval, pause/resume/cancel/rollback.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use vps_orchestrator::{plan_task, Task, TaskEvent};
use vps_stream::StreamSink;

use crate::error::ApiError;
use crate::llm_factory::resolve_provider;
use crate::sse::sse_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub request: String,
    pub server_id: Option<String>,
    /// The acting user, used to resolve the planning LLM's API key. Not
    /// part of spec.md's literal body shape, but required to build a
    /// provider — mirrors `chat`'s `userId` field.
    pub user_id: String,
}

/// `POST /api/agent/tasks/plan` — `{plan}` (§6).
pub async fn plan(State(state): State<AppState>, Json(request): Json<PlanRequest>) -> Result<Json<Value>, ApiError> {
    let provider = resolve_provider(&state, &request.user_id, "claude-sonnet").await?;

    let server_info = match &request.server_id {
        Some(id) => state
            .store
            .get_server(id)
            .await?
            .map(|s| format!("{}@{}:{}", s.username, s.host, s.port))
            .unwrap_or_else(|| "unknown server".to_string()),
        None => "no server selected".to_string(),
    };

    let plan = plan_task(&provider, &request.request, &server_info).await;
    Ok(Json(json!({"plan": plan})))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub server_id: String,
    pub plan: vps_orchestrator::Plan,
    pub user_id: String,
}

/// `POST /api/agent/tasks` — `{task}` (§6).
pub async fn create(State(state): State<AppState>, Json(request): Json<CreateTaskRequest>) -> Json<Value> {
    let task = Task::from_plan(request.user_id, request.server_id, request.plan);
    let task = state.orchestrator.create_task(task).await;
    Json(json!({"task": task}))
}

/// `POST /api/agent/tasks/:id/execute` — SSE stream of task events (§6).
/// Subscribes to the event bus before kicking off execution and relays
/// every event whose `task_id()` matches, unsubscribing on client
/// disconnect (§4.6 "The execution HTTP endpoint subscribes to these...").
pub async fn execute(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    let (sink, response) = sse_response();
    let mut events_rx = state.orchestrator.events().subscribe();
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        let relay_task_id = task_id.clone();
        let relay = tokio::spawn(async move {
            loop {
                match events_rx.recv().await {
                    Ok(event) if event.task_id() == relay_task_id => {
                        let is_terminal = matches!(
                            event,
                            TaskEvent::TaskCompleted(_)
                                | TaskEvent::TaskFailed(_)
                                | TaskEvent::TaskRolledBack(_)
                                | TaskEvent::TaskCancelled(_)
                                | TaskEvent::TaskPaused(_)
                                | TaskEvent::TaskNeedsApproval { .. }
                        );
                        if sink.emit(task_event_frame(&event)).await.is_err() {
                            break;
                        }
                        if is_terminal {
                            break;
                        }
                    }
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
            sink.end().await;
        });

        // Give the subscriber a moment to attach before the first step
        // can possibly complete and publish.
        tokio::time::sleep(Duration::from_millis(1)).await;

        if let Err(e) = orchestrator.execute_task(&task_id).await {
            tracing::warn!(error = %e, task_id = %task_id, "task execution failed to start");
        }

        let _ = relay.await;
    });

    response
}

fn task_event_frame(event: &TaskEvent) -> Value {
    match event {
        TaskEvent::TaskCreated(t) => json!({"event": "taskCreated", "task": t}),
        TaskEvent::TaskUpdated(t) => json!({"event": "taskUpdated", "task": t}),
        TaskEvent::StepStarted { step, .. } => json!({"event": "stepStarted", "step": step}),
        TaskEvent::StepCompleted { step, .. } => json!({"event": "stepCompleted", "step": step}),
        TaskEvent::StepFailed { step, .. } => json!({"event": "stepFailed", "step": step}),
        TaskEvent::TaskNeedsApproval { task, step } => json!({"event": "taskNeedsApproval", "task": task, "step": step}),
        TaskEvent::TaskCompleted(t) => json!({"event": "taskCompleted", "task": t, "done": true}),
        TaskEvent::TaskFailed(t) => json!({"event": "taskFailed", "task": t, "done": true}),
        TaskEvent::StepRollingBack { step, .. } => json!({"event": "stepRollingBack", "step": step}),
        TaskEvent::StepRolledBack { step, .. } => json!({"event": "stepRolledBack", "step": step}),
        TaskEvent::StepRollbackFailed { step, .. } => json!({"event": "stepRollbackFailed", "step": step}),
        TaskEvent::TaskRolledBack(t) => json!({"event": "taskRolledBack", "task": t, "done": true}),
        TaskEvent::TaskCancelled(t) => json!({"event": "taskCancelled", "task": t, "done": true}),
        TaskEvent::TaskPaused(t) => json!({"event": "taskPaused", "task": t, "done": true}),
        TaskEvent::StepApproved { step, .. } => json!({"event": "stepApproved", "step": step}),
    }
}

/// `POST /api/agent/tasks/:id/steps/:sid/approve` — `{task}` (§6).
pub async fn approve_step(State(state): State<AppState>, Path((task_id, step_id)): Path<(String, String)>) -> Result<Json<Value>, ApiError> {
    let task = state.orchestrator.approve_step(&task_id, &step_id).await?;
    Ok(Json(json!({"task": task})))
}

/// `POST /api/agent/tasks/:id/pause` — `{task}` (§6).
pub async fn pause(State(state): State<AppState>, Path(task_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let task = state.orchestrator.pause_task(&task_id).await?;
    Ok(Json(json!({"task": task})))
}

/// `POST /api/agent/tasks/:id/resume` — `{task}` (§6).
pub async fn resume(State(state): State<AppState>, Path(task_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let task = state.orchestrator.resume_task(&task_id).await?;
    Ok(Json(json!({"task": task})))
}

/// `POST /api/agent/tasks/:id/cancel` — `{task}` (§6).
pub async fn cancel(State(state): State<AppState>, Path(task_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let task = state.orchestrator.cancel_task(&task_id).await?;
    Ok(Json(json!({"task": task})))
}

/// `POST /api/agent/tasks/:id/rollback` — SSE (§6).
pub async fn rollback(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    let (sink, response) = sse_response();
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        match orchestrator.rollback_task(&task_id).await {
            Ok(task) => {
                let _ = sink.emit(json!({"task": task, "done": true})).await;
            }
            Err(e) => {
                let _ = sink.emit(json!({"error": e.to_string()})).await;
            }
        }
        sink.end().await;
    });

    response
}
