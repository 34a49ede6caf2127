use thiserror::Error;

/// Infrastructure-level agent-loop failures (§7) that abort the stream with
/// an `{error}` frame, as distinct from tool-data failures which flow back
/// into the conversation as `tool_result` content.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("upstream LLM error: {0}")]
    LlmUpstream(#[from] vps_llm::LlmError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("stream closed")]
    StreamClosed,
}

impl From<vps_store::StoreError> for AgentError {
    fn from(value: vps_store::StoreError) -> Self {
        AgentError::StoreUnavailable(value.to_string())
    }
}

impl From<vps_stream::StreamError> for AgentError {
    fn from(_: vps_stream::StreamError) -> Self {
        AgentError::StreamClosed
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
