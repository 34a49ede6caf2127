//! `ServerConnection`: host, port, username, plus exactly one of
//! {password, privateKey} (§4.2).

use zeroize::Zeroizing;

/// Ready timeout for establishing a connection, before any exec/shell
/// request is sent (§4.2).
pub const READY_TIMEOUT_SECS: u64 = 10;

/// Exec timeout bounds; caller-supplied values are clamped into this range
/// (§4.2, §8 boundary behavior).
pub const MIN_EXEC_TIMEOUT_SECS: u64 = 1;
pub const MAX_EXEC_TIMEOUT_SECS: u64 = 300;

#[derive(Clone)]
pub enum Credential {
    Password(Zeroizing<String>),
    PrivateKey {
        key: Zeroizing<String>,
        passphrase: Option<Zeroizing<String>>,
    },
}

#[derive(Clone)]
pub struct ServerConnection {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub credential: Credential,
}

impl ServerConnection {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>, credential: Credential) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            credential,
        }
    }
}

/// Clamps a caller-supplied exec timeout into `[1, 300]` seconds (§4.2, §8).
#[must_use]
pub fn clamp_exec_timeout(seconds: u64) -> u64 {
    seconds.clamp(MIN_EXEC_TIMEOUT_SECS, MAX_EXEC_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_above_max() {
        assert_eq!(clamp_exec_timeout(500), 300);
    }

    #[test]
    fn clamps_below_min() {
        assert_eq!(clamp_exec_timeout(0), 1);
    }

    #[test]
    fn leaves_in_range_untouched() {
        assert_eq!(clamp_exec_timeout(45), 45);
    }
}
