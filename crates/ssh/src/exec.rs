//! One-shot exec (§4.2a): opens a connection, runs a command, accumulates
//! stdout/stderr, resolves with `{stdout, stderr, exitCode}` on channel
//! close. Hard timeout aborts the connection. Connections are closed on
//! every path.

use std::time::Duration;

use russh::{ChannelMsg, Disconnect};

use crate::client::connect_and_authenticate;
use crate::connection::{clamp_exec_timeout, ServerConnection};
use crate::error::{Result, SshError};

#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    /// Merges stderr into stdout with a `[STDERR]` marker, the shape the
    /// dispatcher returns to the LLM (§4.2).
    #[must_use]
    pub fn merged_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n[STDERR]\n{}", self.stdout, self.stderr)
        }
    }
}

/// Runs `command` over a fresh SSH connection to `conn`, with `timeout_secs`
/// clamped to `[1, 300]`. The connection is always closed, regardless of
/// outcome.
pub async fn exec(conn: &ServerConnection, command: &str, timeout_secs: u64) -> Result<ExecResult> {
    let timeout = clamp_exec_timeout(timeout_secs);
    let session = connect_and_authenticate(conn).await?;

    let result = run_on_session(&session, command, timeout).await;

    let _ = session
        .disconnect(Disconnect::ByApplication, "", "en")
        .await;

    result
}

async fn run_on_session(
    session: &russh::client::Handle<crate::client::ClientHandler>,
    command: &str,
    timeout_secs: u64,
) -> Result<ExecResult> {
    let mut channel = session
        .channel_open_session()
        .await
        .map_err(SshError::ChannelFail)?;

    channel
        .exec(true, command)
        .await
        .map_err(SshError::ChannelFail)?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = 0i32;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);

    loop {
        let msg = match tokio::time::timeout_at(deadline, channel.wait()).await {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(_) => return Err(SshError::Timeout(timeout_secs)),
        };

        match msg {
            ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            ChannelMsg::ExtendedData { ref data, ext } if ext == 1 => {
                stderr.extend_from_slice(data)
            }
            ChannelMsg::ExitStatus { exit_status } => {
                exit_code = exit_status as i32;
            }
            ChannelMsg::Eof | ChannelMsg::Close => break,
            _ => {}
        }
    }

    Ok(ExecResult {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_output_without_stderr_is_just_stdout() {
        let r = ExecResult {
            stdout: "ok".into(),
            stderr: String::new(),
            exit_code: 0,
        };
        assert_eq!(r.merged_output(), "ok");
    }

    #[test]
    fn merged_output_with_stderr_carries_marker() {
        let r = ExecResult {
            stdout: "partial".into(),
            stderr: "denied".into(),
            exit_code: 1,
        };
        assert_eq!(r.merged_output(), "partial\n[STDERR]\ndenied");
    }
}
