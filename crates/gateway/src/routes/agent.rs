//! `/api/agent/chat`, `/api/agent/approve`, `/api/agent/tools`,
//! `/api/agent/monitor/:serverId` (§6).

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vps_agent::request::AgentRequest;
use vps_agent::{events, Cancellation};
use vps_dispatcher::DispatchContext;
use vps_stream::StreamSink;

use crate::error::ApiError;
use crate::llm_factory::resolve_provider;
use crate::sse::sse_response;
use crate::state::AppState;

/// `POST /api/agent/chat` — SSE stream of `{conversationId|content|
/// toolCall|thinking|iteration|done|error}` frames (§6).
pub async fn chat(State(state): State<AppState>, Json(request): Json<AgentRequest>) -> Result<Response, ApiError> {
    let provider = resolve_provider(&state, &request.user_id, &request.model).await?;
    let (sink, response) = sse_response();

    let agent_loop = state.agent_loop.clone();
    tokio::spawn(async move {
        let cancel = Cancellation::new();
        if let Err(e) = agent_loop.run(request, &provider, &sink, &cancel).await {
            tracing::warn!(error = %e, "agent loop ended with an error");
            let _ = sink.emit(events::error(&e.to_string())).await;
        }
        sink.end().await;
    });

    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub server_id: String,
    pub approval_id: String,
    pub approved: bool,
}

/// `POST /api/agent/approve` — the sole resumption path for a tool call
/// the dispatcher short-circuited (§4.4, §6).
pub async fn approve(State(state): State<AppState>, Json(request): Json<ApproveRequest>) -> Result<Json<Value>, ApiError> {
    let server = state
        .store
        .get_server(&request.server_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no such server: {}", request.server_id)))?;

    let context = DispatchContext::new(server.user_id.clone()).with_server(server);
    let result = state.dispatcher.approve(&request.approval_id, request.approved, &context).await;

    if !request.approved {
        return Ok(Json(json!({
            "success": result.success,
            "message": result.output,
            "error": result.error,
        })));
    }

    Ok(Json(json!({
        "success": result.success,
        "output": result.output,
        "error": result.error,
    })))
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolSummary>,
    pub categories: std::collections::BTreeMap<&'static str, Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
pub struct ToolSummary {
    pub name: &'static str,
    pub description: &'static str,
}

/// `GET /api/agent/tools` — `{tools:[{name,description}], categories}` (§6).
pub async fn tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state
        .catalog
        .list()
        .iter()
        .map(|entry| ToolSummary { name: entry.name, description: entry.description })
        .collect();
    let categories = state.catalog.categories();
    Json(ToolsResponse { tools, categories })
}

/// `GET /api/agent/monitor/:serverId` — lightweight liveness/metrics probe
/// built on the same SSH executor the rest of the core uses, not a
/// separate monitoring stack (out of scope per §1).
pub async fn monitor(State(state): State<AppState>, Path(server_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .store
        .get_server(&server_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no such server: {server_id}")))?;

    let plaintext = state
        .vault
        .decrypt_credential(&server.encrypted_credential)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let credential = match server.auth_method {
        vps_store::types::AuthMethod::Password => vps_ssh::Credential::Password(plaintext),
        vps_store::types::AuthMethod::Key => vps_ssh::Credential::PrivateKey { key: plaintext, passphrase: None },
    };
    let conn = vps_ssh::ServerConnection::new(server.host.clone(), server.port, server.username.clone(), credential);

    let mut alerts = Vec::new();
    let metrics = match vps_ssh::exec(&conn, "uptime && df -h / && free -m", 10).await {
        Ok(result) if result.exit_code == 0 => json!({"raw": result.merged_output()}),
        Ok(result) => {
            alerts.push(format!("metrics command exited with code {}", result.exit_code));
            json!({"raw": result.merged_output()})
        }
        Err(e) => {
            alerts.push(format!("unreachable: {e}"));
            json!(null)
        }
    };

    Ok(Json(json!({"metrics": metrics, "alerts": alerts})))
}
