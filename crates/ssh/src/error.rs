use thiserror::Error;

/// §4.2 failure model: exit codes are data, never errors; only
/// connection/auth/channel/timeout failures land here.
#[derive(Error, Debug)]
pub enum SshError {
    #[error("could not reach {host}:{port}: {source}")]
    Unreachable {
        host: String,
        port: u16,
        #[source]
        source: russh::Error,
    },

    #[error("authentication rejected for {username}@{host}")]
    AuthFail { username: String, host: String },

    #[error("exec timed out after {0}s")]
    Timeout(u64),

    #[error("channel error: {0}")]
    ChannelFail(#[source] russh::Error),
}

pub type Result<T> = std::result::Result<T, SshError>;
