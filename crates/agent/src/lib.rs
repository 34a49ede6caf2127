//! C5 Agent Loop (§4.5): LLM tool-use iteration interleaving model calls,
//! tool dispatch, and streamed deltas to the client, with conversation
//! memory compression and usage accounting.

pub mod api_keys;
pub mod cancellation;
pub mod error;
pub mod events;
pub mod memory;
pub mod pricing;
pub mod prompt;
pub mod request;
mod runner;

pub use cancellation::Cancellation;
pub use error::{AgentError, Result};
pub use request::AgentRequest;
pub use runner::{AgentLoop, MAX_ITERATIONS, MAX_TOKENS};
