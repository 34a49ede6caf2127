use thiserror::Error;

/// Infrastructure-level orchestrator failures (§7) — step-level command
/// failures are data recorded on the `TaskStep`, not errors of this kind.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    TaskStore(#[from] crate::store::TaskStoreError),
    #[error("credential vault error: {0}")]
    Vault(#[from] vps_vault::VaultError),
    #[error("no server context for task {0}")]
    NoServer(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
