//! Shared connect/authenticate path for both one-shot exec and interactive
//! shell modes (§4.2). Grounded on the `russh::client` handshake used by
//! passman-proxy's SSH tool: host keys are accepted unconditionally since
//! the host was already explicitly chosen by the caller (no known_hosts
//! store in scope here).

use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle};
use russh_keys::decode_secret_key;

use crate::connection::{Credential, ServerConnection, READY_TIMEOUT_SECS};
use crate::error::{Result, SshError};

pub(crate) struct ClientHandler;

#[async_trait::async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Connects and authenticates against `conn`, returning an authenticated
/// session handle.
pub(crate) async fn connect_and_authenticate(
    conn: &ServerConnection,
) -> Result<Handle<ClientHandler>> {
    let config = Arc::new(client::Config::default());
    let addr = (conn.host.as_str(), conn.port);

    let mut session = tokio::time::timeout(
        Duration::from_secs(READY_TIMEOUT_SECS),
        client::connect(config, addr, ClientHandler),
    )
    .await
    .map_err(|_| SshError::Unreachable {
        host: conn.host.clone(),
        port: conn.port,
        source: russh::Error::ConnectionTimeout,
    })?
    .map_err(|source| SshError::Unreachable {
        host: conn.host.clone(),
        port: conn.port,
        source,
    })?;

    let authenticated = match &conn.credential {
        Credential::PrivateKey { key, passphrase } => {
            let key_pair = decode_secret_key(key, passphrase.as_deref().map(|p| p.as_str()))
                .map_err(|_| SshError::AuthFail {
                    username: conn.username.clone(),
                    host: conn.host.clone(),
                })?;
            session
                .authenticate_publickey(&conn.username, Arc::new(key_pair))
                .await
                .map_err(|source| SshError::Unreachable {
                    host: conn.host.clone(),
                    port: conn.port,
                    source,
                })?
        }
        Credential::Password(password) => session
            .authenticate_password(&conn.username, password.as_str())
            .await
            .map_err(|source| SshError::Unreachable {
                host: conn.host.clone(),
                port: conn.port,
                source,
            })?,
    };

    if !authenticated {
        return Err(SshError::AuthFail {
            username: conn.username.clone(),
            host: conn.host.clone(),
        });
    }

    Ok(session)
}
