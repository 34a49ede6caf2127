use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::{CompleteRequest, CompleteResponse, StreamEvent};

/// C11 LLM Port: a chat interface with thinking and tool-use support
/// (§4.11).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model id this provider serves requests for (e.g. `"claude-sonnet"`).
    fn model_id(&self) -> &str;

    /// Non-streaming helper: returns the full response with `content[]`
    /// blocks and `usage` (§4.11).
    async fn complete(&self, request: CompleteRequest) -> Result<CompleteResponse>;

    /// Streams deltas as they arrive. The receiver yields events in order,
    /// terminated by `StreamEvent::Stop`; the sender side is dropped on
    /// completion or error.
    async fn stream(&self, request: CompleteRequest) -> Result<mpsc::Receiver<StreamEvent>>;
}
