//! C9 Store Port (§4.9): a narrow persistence interface the core calls
//! through. §4.9 calls its operation list "not exhaustive"; this trait is
//! SPEC_FULL's concrete closure of it over every §3 entity.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ApiUsage, BackupConfig, CommandHistory, Conversation, ConversationSummary, GithubIntegration,
    Message, Otp, Server, User, UserApiKey,
};

#[async_trait]
pub trait Store: Send + Sync {
    // Users / OTP
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
    async fn create_user(&self, username: &str) -> Result<User>;
    async fn create_otp(&self, user_id: &str, code: &str) -> Result<Otp>;
    /// Consumes an OTP if it exists, is unconsumed, and its code matches.
    async fn consume_otp(&self, user_id: &str, code: &str) -> Result<bool>;

    // Servers
    async fn create_server(&self, server: Server) -> Result<Server>;
    async fn get_server(&self, server_id: &str) -> Result<Option<Server>>;
    async fn list_servers(&self, user_id: &str) -> Result<Vec<Server>>;
    async fn update_server(&self, server: Server) -> Result<Server>;
    async fn delete_server(&self, server_id: &str) -> Result<()>;

    // Conversations
    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation>;
    async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>>;
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>>;
    async fn update_conversation(&self, conversation: Conversation) -> Result<Conversation>;

    // Messages
    async fn append_message(&self, message: Message) -> Result<Message>;
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    // Conversation summaries
    async fn append_conversation_summary(&self, summary: ConversationSummary) -> Result<ConversationSummary>;
    async fn list_conversation_summaries(&self, conversation_id: &str) -> Result<Vec<ConversationSummary>>;

    // Command history
    async fn append_command_history(&self, entry: CommandHistory) -> Result<CommandHistory>;
    async fn list_command_history(&self, vps_server_id: &str, limit: usize) -> Result<Vec<CommandHistory>>;

    // GitHub integration
    async fn get_github_integration(&self, user_id: &str) -> Result<Option<GithubIntegration>>;
    async fn create_github_integration(&self, integration: GithubIntegration) -> Result<GithubIntegration>;
    async fn update_github_integration(&self, integration: GithubIntegration) -> Result<GithubIntegration>;
    async fn delete_github_integration(&self, user_id: &str) -> Result<()>;

    // Backup configs
    async fn list_backup_configs(&self, vps_server_id: &str) -> Result<Vec<BackupConfig>>;
    async fn get_backup_config(&self, id: &str) -> Result<Option<BackupConfig>>;
    async fn create_backup_config(&self, config: BackupConfig) -> Result<BackupConfig>;

    // API usage
    async fn append_api_usage(&self, usage: ApiUsage) -> Result<ApiUsage>;

    // User-supplied provider API keys (§4.5 step 1)
    async fn get_user_api_key(&self, user_id: &str, provider: &str) -> Result<Option<UserApiKey>>;
    async fn set_user_api_key(&self, key: UserApiKey) -> Result<UserApiKey>;
}
