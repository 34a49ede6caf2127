//! C11 LLM Port types (§4.11).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

/// `messages(messages, system, tools?, thinking?, maxTokens, model)` (§4.11).
#[derive(Debug, Clone)]
pub struct CompleteRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Value>,
    pub tools: Option<Vec<Value>>,
    pub thinking: bool,
    pub max_tokens: u32,
}

/// Streaming event variants (§4.11).
#[derive(Debug, Clone)]
pub enum StreamEvent {
    TextDelta(String),
    ThinkingDelta(String),
    ToolUseStart { id: String, name: String },
    ToolUseInput { id: String, partial_json: String },
    Usage(Usage),
    Stop,
}
