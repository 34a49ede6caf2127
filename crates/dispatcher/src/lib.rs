//! C4 Tool Dispatcher — routes tool calls to handlers, enforces the
//! approval gate, records history (§4.4).

pub mod approval;
pub mod commands;
pub mod context;
mod dispatcher;
pub mod error;
mod github;
pub mod result;

pub use context::DispatchContext;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use result::ToolResult;
