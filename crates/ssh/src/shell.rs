//! Interactive PTY shell (§4.2b): requests a shell with `xterm-256color`,
//! negotiated cols/rows, streams both directions. Window-change messages
//! forward to the channel. Closing either side tears down the other.

use russh::{ChannelMsg, Disconnect};

use crate::client::{connect_and_authenticate, ClientHandler};
use crate::connection::ServerConnection;
use crate::error::{Result, SshError};

const TERMINAL_TYPE: &str = "xterm-256color";

pub enum ShellEvent {
    Data(Vec<u8>),
    ExtendedData(Vec<u8>),
    ExitStatus(u32),
    Eof,
    Closed,
}

/// A live interactive shell. Owns both the authenticated session and the
/// channel; dropping it tears down the connection.
pub struct ShellSession {
    session: russh::client::Handle<ClientHandler>,
    channel: russh::Channel<russh::client::Msg>,
}

impl ShellSession {
    /// Opens a connection, requests a PTY, and starts a login shell.
    pub async fn open(conn: &ServerConnection, cols: u32, rows: u32) -> Result<Self> {
        let session = connect_and_authenticate(conn).await?;
        let mut channel = session
            .channel_open_session()
            .await
            .map_err(SshError::ChannelFail)?;

        channel
            .request_pty(false, TERMINAL_TYPE, cols, rows, 0, 0, &[])
            .await
            .map_err(SshError::ChannelFail)?;

        channel
            .request_shell(true)
            .await
            .map_err(SshError::ChannelFail)?;

        Ok(Self { session, channel })
    }

    /// Writes raw bytes to the PTY's stdin.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(SshError::ChannelFail)
    }

    /// Forwards a window-change (resize) to the remote PTY.
    pub async fn resize(&mut self, cols: u32, rows: u32) -> Result<()> {
        self.channel
            .window_change(cols, rows, 0, 0)
            .await
            .map_err(SshError::ChannelFail)
    }

    /// Awaits the next event from the channel. Unhandled control frames
    /// (e.g. `WindowAdjusted`, `Success`) are skipped rather than treated as
    /// closure — only `wait()` itself returning `None` ends the session.
    pub async fn next_event(&mut self) -> Option<ShellEvent> {
        loop {
            match self.channel.wait().await? {
                ChannelMsg::Data { data } => return Some(ShellEvent::Data(data.to_vec())),
                ChannelMsg::ExtendedData { data, .. } => return Some(ShellEvent::ExtendedData(data.to_vec())),
                ChannelMsg::ExitStatus { exit_status } => return Some(ShellEvent::ExitStatus(exit_status)),
                ChannelMsg::Eof => return Some(ShellEvent::Eof),
                ChannelMsg::Close => return Some(ShellEvent::Closed),
                _ => {}
            }
        }
    }

    /// Tears down the channel and the underlying SSH connection.
    pub async fn close(mut self) {
        let _ = self.channel.eof().await;
        let _ = self
            .session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await;
    }
}
