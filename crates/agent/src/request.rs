//! `AgentRequest`: the inbound shape of `POST /api/agent/chat` (§4.5, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    pub user_id: String,
    pub content: String,
    pub conversation_id: Option<String>,
    pub server_id: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub enable_thinking: bool,
    #[serde(default)]
    pub enable_research: bool,
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn default_model() -> String {
    "claude-sonnet".to_string()
}
