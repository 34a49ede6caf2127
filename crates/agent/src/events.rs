//! SSE frame shapes streamed from the agent loop (§4.5, §6).

use serde_json::{json, Value};

#[must_use]
pub fn conversation_id(conversation_id: &str) -> Value {
    json!({"conversationId": conversation_id})
}

#[must_use]
pub fn research_status(started: bool) -> Value {
    json!({"research": {"status": if started { "running" } else { "done" }}})
}

#[must_use]
pub fn text_delta(text: &str) -> Value {
    json!({"content": text})
}

#[must_use]
pub fn tool_executing(name: &str, input: &Value) -> Value {
    json!({"toolCall": {"name": name, "input": input, "status": "executing"}})
}

#[must_use]
pub fn tool_requires_approval(name: &str, pending_command: &str, message: &str) -> Value {
    json!({
        "toolCall": {
            "name": name,
            "status": "requires_approval",
            "pendingCommand": pending_command,
            "message": message,
        }
    })
}

#[must_use]
pub fn tool_finished(name: &str, success: bool, duration_ms: u128, output_preview: &str) -> Value {
    json!({
        "toolCall": {
            "name": name,
            "status": if success { "success" } else { "error" },
            "duration": duration_ms,
            "outputPreview": output_preview,
        }
    })
}

#[must_use]
pub fn iteration(n: u32) -> Value {
    json!({"iteration": n})
}

#[must_use]
pub fn pending_approval_done(conversation_id: &str, tools_used: &[String]) -> Value {
    json!({
        "done": true,
        "conversationId": conversation_id,
        "mode": "agent",
        "pendingApproval": true,
        "toolsUsed": tools_used,
    })
}

#[must_use]
pub fn done(conversation_id: &str, tools_used: &[String], iterations: u32) -> Value {
    json!({
        "done": true,
        "conversationId": conversation_id,
        "mode": "agent",
        "toolsUsed": tools_used,
        "iterations": iterations,
    })
}

#[must_use]
pub fn error(message: &str) -> Value {
    json!({"error": message})
}
