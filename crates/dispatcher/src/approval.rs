//! Pending-approval persistence (§9 open question, resolved per
//! SPEC_FULL.md §C): approvals are keyed by an opaque server-issued id, and
//! the `approve` entry point accepts only that id — never a client-echoed
//! command string, which would be replay-unsafe.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// A tool call the dispatcher short-circuited before execution (§4.4).
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub id: String,
    pub tool_name: String,
    pub command: String,
    pub server_id: String,
    pub reason: String,
}

/// In-process store of pending approvals, keyed by opaque id. Entries are
/// removed once resolved (approved or rejected) — each id is usable once.
#[derive(Clone, Default)]
pub struct ApprovalStore {
    pending: Arc<RwLock<HashMap<String, PendingApproval>>>,
}

impl ApprovalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, tool_name: &str, command: &str, server_id: &str, reason: &str) -> PendingApproval {
        let approval = PendingApproval {
            id: vps_common::new_id(),
            tool_name: tool_name.to_string(),
            command: command.to_string(),
            server_id: server_id.to_string(),
            reason: reason.to_string(),
        };
        self.pending
            .write()
            .await
            .insert(approval.id.clone(), approval.clone());
        approval
    }

    /// Removes and returns the pending approval for `id`, if any. Each id
    /// is single-use.
    pub async fn take(&self, id: &str) -> Option<PendingApproval> {
        self.pending.write().await.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_approval_is_retrievable_once() {
        let store = ApprovalStore::new();
        let approval = store.create("execute_command", "rm -rf /var/log", "srv-1", "dangerous pattern").await;

        let taken = store.take(&approval.id).await.unwrap();
        assert_eq!(taken.command, "rm -rf /var/log");

        assert!(store.take(&approval.id).await.is_none());
    }
}
