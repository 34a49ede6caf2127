//! Terminal Relay session management (§4.7): bridges a WebSocket to a
//! PTY-backed SSH shell. Sessions are keyed by a server-issued session id;
//! each owns its SSH client and PTY exclusively and is never shared across
//! requests (§5).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use vps_ssh::{ServerConnection, ShellEvent, ShellSession};

use crate::buffer::CommandBuffer;
use crate::protocol::ServerFrame;

/// A handle to a running relay task. Dropping it does not tear the session
/// down; call [`TerminalSessions::disconnect`] explicitly (mirrors §4.7's
/// `disconnect` message and the websocket-close teardown path).
struct ActiveSession {
    input_tx: mpsc::Sender<SessionCommand>,
    buffer: Arc<RwLock<CommandBuffer>>,
}

enum SessionCommand {
    Write(Vec<u8>),
    Resize { cols: u32, rows: u32 },
    Close,
}

/// Keyed map of live terminal sessions (§5 "Active terminal sessions are
/// stored in a keyed map keyed by session id").
#[derive(Clone, Default)]
pub struct TerminalSessions {
    sessions: Arc<RwLock<HashMap<String, ActiveSession>>>,
}

impl TerminalSessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an SSH connection, requests a PTY shell, and starts relaying
    /// output onto `out`. Returns the newly issued session id.
    pub async fn connect(&self, conn: &ServerConnection, cols: u32, rows: u32, out: mpsc::Sender<ServerFrame>) -> vps_ssh::Result<String> {
        let shell = ShellSession::open(conn, cols, rows).await?;
        let session_id = vps_common::new_id();

        let (input_tx, input_rx) = mpsc::channel(64);
        let buffer = Arc::new(RwLock::new(CommandBuffer::new()));

        tokio::spawn(relay_loop(shell, input_rx, out));

        self.sessions.write().await.insert(
            session_id.clone(),
            ActiveSession { input_tx, buffer },
        );

        Ok(session_id)
    }

    /// Writes raw input bytes to the PTY and updates the advisory command
    /// buffer (§4.7 "input": "Write raw bytes to PTY; update in-memory
    /// command buffer").
    pub async fn input(&self, session_id: &str, data: &[u8]) -> bool {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(session_id) else {
            return false;
        };
        session.buffer.write().await.feed(data);
        session.input_tx.send(SessionCommand::Write(data.to_vec())).await.is_ok()
    }

    pub async fn resize(&self, session_id: &str, cols: u32, rows: u32) -> bool {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(session_id) else {
            return false;
        };
        session.input_tx.send(SessionCommand::Resize { cols, rows }).await.is_ok()
    }

    /// The advisory current-line / history view, used as suggestion
    /// context (§4.7).
    pub async fn current_line(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id)?;
        Some(session.buffer.read().await.current_line().to_string())
    }

    /// Tears down the PTY and SSH client for `session_id` (§4.7
    /// "Teardown"). Idempotent.
    pub async fn disconnect(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(session_id) {
            let _ = session.input_tx.send(SessionCommand::Close).await;
        }
    }
}

async fn relay_loop(mut shell: ShellSession, mut commands: mpsc::Receiver<SessionCommand>, out: mpsc::Sender<ServerFrame>) {
    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(SessionCommand::Write(data)) => {
                        if shell.write(&data).await.is_err() {
                            break;
                        }
                    }
                    Some(SessionCommand::Resize { cols, rows }) => {
                        if shell.resize(cols, rows).await.is_ok() {
                            let _ = out.send(ServerFrame::Resized { cols, rows }).await;
                        }
                    }
                    Some(SessionCommand::Close) | None => break,
                }
            }
            event = shell.next_event() => {
                match event {
                    Some(ShellEvent::Data(data)) | Some(ShellEvent::ExtendedData(data)) => {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        if out.send(ServerFrame::Output { data: text }).await.is_err() {
                            break;
                        }
                    }
                    Some(ShellEvent::ExitStatus(_)) => {}
                    Some(ShellEvent::Eof) | Some(ShellEvent::Closed) | None => break,
                }
            }
        }
    }

    shell.close().await;
    let _ = out.send(ServerFrame::Disconnected { message: "session closed".to_string() }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_of_unknown_session_is_a_no_op() {
        let sessions = TerminalSessions::new();
        sessions.disconnect("missing").await;
    }

    #[tokio::test]
    async fn input_to_unknown_session_returns_false() {
        let sessions = TerminalSessions::new();
        assert!(!sessions.input("missing", b"ls\r").await);
    }

    #[tokio::test]
    async fn resize_to_unknown_session_returns_false() {
        let sessions = TerminalSessions::new();
        assert!(!sessions.resize("missing", 80, 24).await);
    }
}
