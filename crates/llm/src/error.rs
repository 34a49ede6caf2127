use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("upstream LLM error: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
