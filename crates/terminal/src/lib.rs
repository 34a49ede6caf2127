//! C7 Terminal Relay — WebSocket ↔ PTY bridge; input tracking; completion
//! proxy (§4.7).

pub mod buffer;
pub mod protocol;
pub mod session;
pub mod suggest;

pub use buffer::CommandBuffer;
pub use protocol::{ClientFrame, ServerFrame, SuggestionSource};
pub use session::TerminalSessions;
