pub mod agent;
pub mod tasks;
pub mod terminal;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/agent/chat", post(agent::chat))
        .route("/api/agent/approve", post(agent::approve))
        .route("/api/agent/tools", get(agent::tools))
        .route("/api/agent/monitor/{server_id}", get(agent::monitor))
        .route("/api/agent/tasks/plan", post(tasks::plan))
        .route("/api/agent/tasks", post(tasks::create))
        .route("/api/agent/tasks/{id}/execute", post(tasks::execute))
        .route("/api/agent/tasks/{id}/steps/{sid}/approve", post(tasks::approve_step))
        .route("/api/agent/tasks/{id}/pause", post(tasks::pause))
        .route("/api/agent/tasks/{id}/resume", post(tasks::resume))
        .route("/api/agent/tasks/{id}/cancel", post(tasks::cancel))
        .route("/api/agent/tasks/{id}/rollback", post(tasks::rollback))
        .route("/ws/terminal", get(terminal::upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
