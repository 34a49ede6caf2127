//! Reference `LlmProvider`: the Anthropic Messages API, called directly over
//! `reqwest` (the same HTTP client the catalog's GitHub/Research tools use).
//! This is SPEC_FULL's one concrete implementation of C11; §4.11 leaves the
//! provider itself out of scope (it names the interface, not a vendor).

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;
use crate::types::{CompleteRequest, CompleteResponse, ContentBlock, StreamEvent, Usage};

const API_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn body(&self, request: &CompleteRequest, stream: bool) -> Value {
        let mut body = json!({
            "model": self.model,
            "system": request.system,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "stream": stream,
        });
        if let Some(tools) = &request.tools {
            body["tools"] = json!(tools);
        }
        if request.thinking {
            body["thinking"] = json!({"type": "enabled", "budget_tokens": 4096});
        }
        body
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompleteRequest) -> Result<CompleteResponse> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(&request, false))
            .send()
            .await
            .map_err(|e| LlmError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream(format!("{status}: {text}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Upstream(e.to_string()))?;

        parse_complete_response(&body)
    }

    async fn stream(&self, request: CompleteRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(&request, true))
            .send()
            .await
            .map_err(|e| LlmError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream(format!("{status}: {text}")));
        }

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut active_tool_id: Option<String> = None;

            while let Some(chunk) = byte_stream.next().await {
                let Ok(chunk) = chunk else { break };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find("\n\n") {
                    let frame = buffer[..pos].to_string();
                    buffer.drain(..pos + 2);
                    if let Some(event) = parse_sse_frame(&frame, &mut active_tool_id) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }
            let _ = tx.send(StreamEvent::Stop).await;
        });

        Ok(rx)
    }
}

fn parse_complete_response(body: &Value) -> Result<CompleteResponse> {
    let content = body
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| blocks.iter().filter_map(parse_content_block).collect())
        .unwrap_or_default();

    let usage = body
        .get("usage")
        .map(|u| Usage {
            input_tokens: u.get("input_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            output_tokens: u.get("output_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
        })
        .unwrap_or_default();

    Ok(CompleteResponse { content, usage })
}

fn parse_content_block(block: &Value) -> Option<ContentBlock> {
    match block.get("type").and_then(Value::as_str)? {
        "text" => Some(ContentBlock::Text {
            text: block.get("text").and_then(Value::as_str)?.to_string(),
        }),
        "tool_use" => Some(ContentBlock::ToolUse {
            id: block.get("id").and_then(Value::as_str)?.to_string(),
            name: block.get("name").and_then(Value::as_str)?.to_string(),
            input: block.get("input").cloned().unwrap_or(Value::Null),
        }),
        _ => None,
    }
}

/// Parses one `event: ...\ndata: {...}` SSE frame into a `StreamEvent`.
fn parse_sse_frame(frame: &str, active_tool_id: &mut Option<String>) -> Option<StreamEvent> {
    let data_line = frame.lines().find(|l| l.starts_with("data:"))?;
    let data: Value = serde_json::from_str(data_line.trim_start_matches("data:").trim()).ok()?;

    match data.get("type").and_then(Value::as_str)? {
        "content_block_start" => {
            let block = data.get("content_block")?;
            if block.get("type").and_then(Value::as_str) == Some("tool_use") {
                let id = block.get("id").and_then(Value::as_str)?.to_string();
                let name = block.get("name").and_then(Value::as_str)?.to_string();
                *active_tool_id = Some(id.clone());
                Some(StreamEvent::ToolUseStart { id, name })
            } else {
                None
            }
        }
        "content_block_delta" => {
            let delta = data.get("delta")?;
            match delta.get("type").and_then(Value::as_str)? {
                "text_delta" => Some(StreamEvent::TextDelta(
                    delta.get("text").and_then(Value::as_str)?.to_string(),
                )),
                "thinking_delta" => Some(StreamEvent::ThinkingDelta(
                    delta.get("thinking").and_then(Value::as_str)?.to_string(),
                )),
                "input_json_delta" => {
                    let id = active_tool_id.clone()?;
                    Some(StreamEvent::ToolUseInput {
                        id,
                        partial_json: delta.get("partial_json").and_then(Value::as_str)?.to_string(),
                    })
                }
                _ => None,
            }
        }
        "message_delta" => data.get("usage").map(|u| {
            StreamEvent::Usage(Usage {
                input_tokens: u.get("input_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
                output_tokens: u.get("output_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            })
        }),
        "message_stop" => Some(StreamEvent::Stop),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_tool_use_blocks() {
        let body = json!({
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "tool_use", "id": "t1", "name": "execute_command", "input": {"command": "df -h"}}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        });
        let response = parse_complete_response(&body).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 20);
    }

    #[test]
    fn parses_text_delta_frame() {
        let frame = "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"hi\"}}";
        let mut active = None;
        let event = parse_sse_frame(frame, &mut active).unwrap();
        assert!(matches!(event, StreamEvent::TextDelta(t) if t == "hi"));
    }

    #[test]
    fn parses_tool_use_start_then_input_delta() {
        let start = "data: {\"type\":\"content_block_start\",\"content_block\":{\"type\":\"tool_use\",\"id\":\"t1\",\"name\":\"read_file\"}}";
        let mut active = None;
        let event = parse_sse_frame(start, &mut active).unwrap();
        assert!(matches!(event, StreamEvent::ToolUseStart { id, .. } if id == "t1"));

        let delta = "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"path\\\":\"}}";
        let event = parse_sse_frame(delta, &mut active).unwrap();
        assert!(matches!(event, StreamEvent::ToolUseInput { id, .. } if id == "t1"));
    }

    #[test]
    fn message_stop_frame_yields_stop_event() {
        let frame = "data: {\"type\":\"message_stop\"}";
        let mut active = None;
        assert!(matches!(parse_sse_frame(frame, &mut active), Some(StreamEvent::Stop)));
    }
}
