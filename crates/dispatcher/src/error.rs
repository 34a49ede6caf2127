use thiserror::Error;

/// Infrastructure-level dispatcher failures (§7) — distinct from tool-data
/// failures, which are returned as a `ToolResult` rather than thrown.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("credential vault error: {0}")]
    Vault(#[from] vps_vault::VaultError),
    #[error("no approval pending for id {0}")]
    NoSuchApproval(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
