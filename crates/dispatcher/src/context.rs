use vps_store::types::Server;

/// `(toolName, input, context{userId, serverId, serverConnection})` (§4.4).
/// `server` is carried in its still-encrypted form; the dispatcher decrypts
/// its credential itself, immediately before the SSH connect, and never
/// retains the plaintext beyond that call (§5).
#[derive(Clone)]
pub struct DispatchContext {
    pub user_id: String,
    pub server: Option<Server>,
    pub github_token: Option<String>,
}

impl DispatchContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            server: None,
            github_token: None,
        }
    }

    #[must_use]
    pub fn with_server(mut self, server: Server) -> Self {
        self.server = Some(server);
        self
    }

    #[must_use]
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }
}
