//! C11 LLM Port — abstract chat+tools+thinking client (§4.11).

pub mod anthropic;
pub mod error;
pub mod provider;
pub mod types;

#[cfg(feature = "test-util")]
pub mod mock;

pub use anthropic::AnthropicProvider;
pub use error::{LlmError, Result};
pub use provider::LlmProvider;
pub use types::{CompleteRequest, CompleteResponse, ContentBlock, StreamEvent, Usage};
