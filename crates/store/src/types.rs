//! §3 data model — semantic types, not persistence schema. Fields follow
//! §3 literally; anything left opaque (users, OTP) gets the minimal shape
//! the Store Port's own operations require.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Otp {
    pub id: String,
    pub user_id: String,
    pub code: String,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Password,
    Key,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub user_id: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_method: AuthMethod,
    /// Vault-encrypted string; never held in plaintext outside the Vault
    /// boundary (§3 invariant).
    pub encrypted_credential: String,
    pub last_connected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Chat,
    Agent,
    Testing,
    Debug,
    Architect,
    Plan,
    Support,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub vps_server_id: Option<String>,
    pub title: String,
    pub mode: ConversationMode,
    pub parent_conversation_id: Option<String>,
    pub context_summary: Option<String>,
    pub archive_url: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub mode: Option<String>,
    pub tools_used: Vec<String>,
    pub thinking_present: bool,
    pub pending_approval: bool,
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub attachments: Vec<String>,
    pub metadata: Option<MessageMetadata>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub conversation_id: String,
    pub summary: String,
    pub message_range: String,
    pub token_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUsage {
    pub user_id: String,
    pub conversation_id: Option<String>,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    /// Fixed-point decimal string, 6 fraction digits (§4.5).
    pub estimated_cost: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandHistory {
    pub user_id: String,
    pub vps_server_id: String,
    pub command: String,
    pub output: String,
    pub exit_code: i32,
    pub executed_at: DateTime<Utc>,
}

/// A user-supplied LLM/search provider API key (§4.5 step 1: "resolve API
/// keys via user settings with environment fallback"). Stored vault-
/// encrypted, under §4.1's CBC scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserApiKey {
    pub user_id: String,
    pub provider: String,
    pub encrypted_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubIntegration {
    pub user_id: String,
    /// Stored as given by the caller; the core does not encrypt this value
    /// itself (§6: "per-user token stored in the Store").
    pub token: String,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryType {
    Local,
    S3,
    Sftp,
    B2,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub daily: Option<u32>,
    pub weekly: Option<u32>,
    pub monthly: Option<u32>,
    pub yearly: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    pub id: String,
    pub name: String,
    pub vps_server_id: String,
    pub repository_type: RepositoryType,
    pub repository_path: String,
    /// Vault-encrypted.
    pub encrypted_password: String,
    pub encrypted_access_key_id: Option<String>,
    pub encrypted_secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub include_paths: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub retention: RetentionPolicy,
}
