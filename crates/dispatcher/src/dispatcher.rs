//! C4 Tool Dispatcher (§4.4): resolves a tool call to a handler, enforces
//! the approval gate, executes it, and records history.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use vps_catalog::{is_dangerous_command, validate_input, Catalog, ToolFamily};
use vps_ssh::{Credential, ServerConnection};
use vps_store::types::{AuthMethod, BackupConfig, CommandHistory, RepositoryType, RetentionPolicy};
use vps_store::Store;
use vps_vault::Vault;

use crate::approval::ApprovalStore;
use crate::commands::build_command;
use crate::context::DispatchContext;
use crate::github;
use crate::result::ToolResult;

pub struct Dispatcher {
    catalog: Arc<Catalog>,
    store: Arc<dyn Store>,
    vault: Arc<Vault>,
    approvals: ApprovalStore,
    http: reqwest::Client,
}

impl Dispatcher {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn Store>, vault: Arc<Vault>) -> Self {
        Self {
            catalog,
            store,
            vault,
            approvals: ApprovalStore::new(),
            http: reqwest::Client::new(),
        }
    }

    /// `(toolName, input, context)` → `ToolResult` (§4.4 steps 1-6).
    pub async fn dispatch(&self, tool_name: &str, input: Value, context: &DispatchContext) -> ToolResult {
        let Some(entry) = self.catalog.get(tool_name) else {
            return ToolResult::err(format!("unknown tool: {tool_name}"));
        };

        if let Err(e) = validate_input(&entry.input_schema, &input) {
            return ToolResult::err(format!("invalid input: {e}"));
        }

        if tool_name == "backup_create" {
            return self.create_backup_config(&input, context).await;
        }

        if entry.family == ToolFamily::GitHub {
            let Some(token) = &context.github_token else {
                return ToolResult::err("no GitHub integration configured for this user");
            };
            return github::dispatch(&self.http, token, tool_name, &input)
                .await
                .unwrap_or_else(|| ToolResult::err(format!("unsupported GitHub tool: {tool_name}")));
        }

        let Some(command) = build_command(tool_name, &input) else {
            return ToolResult::err(format!("no command builder for tool: {tool_name}"));
        };

        let danger_reason = is_dangerous_command(&command).then_some("matches the danger classifier");
        let reason = danger_reason.or(entry.intrinsically_dangerous.then_some("intrinsically dangerous handler"));

        if let Some(reason) = reason {
            let Some(server) = &context.server else {
                return ToolResult::err("no server context for a remote command");
            };
            let approval = self.approvals.create(tool_name, &command, &server.id, reason).await;
            return ToolResult::needs_approval(
                command,
                format!("This command requires approval ({reason})."),
            )
            .with_metadata(json!({"approval_id": approval.id}));
        }

        self.execute_remote(&command, context).await
    }

    /// The sole resumption path (§4.4 "Approval resumption"): looks up the
    /// pending approval by its opaque id and either runs it exactly as
    /// originally constructed, or returns a rejection.
    pub async fn approve(&self, approval_id: &str, approved: bool, context: &DispatchContext) -> ToolResult {
        let Some(pending) = self.approvals.take(approval_id).await else {
            return ToolResult::err("no pending approval with that id");
        };

        if !approved {
            return ToolResult::ok("Command rejected");
        }

        self.execute_remote(&pending.command, context).await
    }

    /// `backup_create` persists a `BackupConfig` row (§4.3); it is not an
    /// SSH command and never goes through `build_command`/`execute_remote`.
    async fn create_backup_config(&self, input: &Value, context: &DispatchContext) -> ToolResult {
        let Some(server) = &context.server else {
            return ToolResult::err("no server context for backup_create");
        };

        let name = input.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        let repository_path = input.get("repository_path").and_then(Value::as_str).unwrap_or_default().to_string();
        let repository_type = match input.get("repository_type").and_then(Value::as_str) {
            Some("local") => RepositoryType::Local,
            Some("s3") => RepositoryType::S3,
            Some("sftp") => RepositoryType::Sftp,
            Some("b2") => RepositoryType::B2,
            _ => return ToolResult::err("repository_type must be one of local, s3, sftp, b2"),
        };

        let password = input.get("password").and_then(Value::as_str).unwrap_or_default();
        let encrypted_password = match self.vault.encrypt_backup_secret(password) {
            Ok(ct) => ct,
            Err(e) => return ToolResult::err(format!("failed to encrypt backup password: {e}")),
        };

        let encrypted_access_key_id = match input.get("access_key_id").and_then(Value::as_str) {
            Some(v) if !v.is_empty() => match self.vault.encrypt_backup_secret(v) {
                Ok(ct) => Some(ct),
                Err(e) => return ToolResult::err(format!("failed to encrypt access key id: {e}")),
            },
            _ => None,
        };

        let encrypted_secret_access_key = match input.get("secret_access_key").and_then(Value::as_str) {
            Some(v) if !v.is_empty() => match self.vault.encrypt_backup_secret(v) {
                Ok(ct) => Some(ct),
                Err(e) => return ToolResult::err(format!("failed to encrypt secret access key: {e}")),
            },
            _ => None,
        };

        let include_paths = input
            .get("include_paths")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        let exclude_patterns = input
            .get("exclude_patterns")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let config = BackupConfig {
            id: vps_common::new_id(),
            name,
            vps_server_id: server.id.clone(),
            repository_type,
            repository_path,
            encrypted_password,
            encrypted_access_key_id,
            encrypted_secret_access_key,
            endpoint: input.get("endpoint").and_then(Value::as_str).map(str::to_string),
            region: input.get("region").and_then(Value::as_str).map(str::to_string),
            include_paths,
            exclude_patterns,
            retention: RetentionPolicy::default(),
        };

        match self.store.create_backup_config(config).await {
            Ok(created) => ToolResult::ok(format!("created backup config {}", created.id))
                .with_metadata(json!({"backup_config_id": created.id})),
            Err(e) => ToolResult::err(format!("failed to save backup config: {e}")),
        }
    }

    async fn execute_remote(&self, command: &str, context: &DispatchContext) -> ToolResult {
        let Some(server) = &context.server else {
            return ToolResult::err("no server context for a remote command");
        };

        let plaintext = match self.vault.decrypt_credential(&server.encrypted_credential) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(format!("credential decrypt failed: {e}")),
        };

        let credential = match server.auth_method {
            AuthMethod::Password => Credential::Password(plaintext),
            AuthMethod::Key => Credential::PrivateKey {
                key: plaintext,
                passphrase: None,
            },
        };
        let conn = ServerConnection::new(server.host.clone(), server.port, server.username.clone(), credential);

        let exec_outcome = vps_ssh::exec(&conn, command, 30).await;
        drop(conn); // credential plaintext is held only for the connect call (§5)

        match exec_outcome {
            Ok(result) => {
                let _ = self
                    .store
                    .append_command_history(CommandHistory {
                        user_id: context.user_id.clone(),
                        vps_server_id: server.id.clone(),
                        command: command.to_string(),
                        output: result.merged_output(),
                        exit_code: result.exit_code,
                        executed_at: Utc::now(),
                    })
                    .await;

                if result.exit_code == 0 {
                    ToolResult::ok(result.merged_output()).with_metadata(json!({"exit_code": 0}))
                } else {
                    ToolResult {
                        success: false,
                        output: crate::result::truncate(&result.merged_output(), crate::result::MAX_TOOL_RESULT_CHARS),
                        error: Some(format!("command exited with code {}", result.exit_code)),
                        metadata: Some(json!({"exit_code": result.exit_code})),
                        requires_approval: false,
                        pending_command: None,
                    }
                }
            }
            Err(e) => {
                if matches!(e, vps_ssh::SshError::Timeout(_)) {
                    let _ = self
                        .store
                        .append_command_history(CommandHistory {
                            user_id: context.user_id.clone(),
                            vps_server_id: server.id.clone(),
                            command: command.to_string(),
                            output: String::new(),
                            exit_code: -1,
                            executed_at: Utc::now(),
                        })
                        .await;
                }
                ToolResult::err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vps_store::types::{AuthMethod, Server};
    use vps_store::InMemoryStore;
    use vps_vault::secret::{ApiKeySecret, EncryptionKeySecret, SessionSecret};

    use super::*;

    fn dispatcher_with_server() -> (Dispatcher, DispatchContext) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let vault = Arc::new(
            Vault::new(&SessionSecret::new("s"), &ApiKeySecret::new("a"), &EncryptionKeySecret::new("e")).unwrap(),
        );
        let catalog = Arc::new(Catalog::new());
        let server = Server {
            id: vps_common::new_id(),
            user_id: "user-1".into(),
            host: "203.0.113.5".into(),
            port: 22,
            username: "root".into(),
            auth_method: AuthMethod::Key,
            encrypted_credential: "iv:tag:ct".into(),
            last_connected_at: None,
        };
        let context = DispatchContext::new("user-1").with_server(server);
        (Dispatcher::new(catalog, store, vault), context)
    }

    #[tokio::test]
    async fn backup_create_persists_a_config_instead_of_running_a_command() {
        let (dispatcher, context) = dispatcher_with_server();
        let input = json!({
            "name": "nightly",
            "repository_type": "local",
            "repository_path": "/mnt/backups/nightly",
            "password": "hunter2"
        });

        let result = dispatcher.dispatch("backup_create", input, &context).await;

        assert!(result.success, "backup_create should succeed: {:?}", result.error);
        assert!(result.metadata.unwrap().get("backup_config_id").is_some());

        let configs = dispatcher
            .store
            .list_backup_configs(&context.server.as_ref().unwrap().id)
            .await
            .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "nightly");
        assert_ne!(configs[0].encrypted_password, "hunter2", "password must be vault-encrypted");
    }

    #[tokio::test]
    async fn backup_create_rejects_unknown_repository_type() {
        let (dispatcher, context) = dispatcher_with_server();
        let input = json!({
            "name": "nightly",
            "repository_type": "ftp",
            "repository_path": "/mnt/backups/nightly",
            "password": "hunter2"
        });

        let result = dispatcher.dispatch("backup_create", input, &context).await;
        assert!(!result.success);
    }
}
