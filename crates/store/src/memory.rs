//! In-memory reference implementation, the default backend per §9
//! ("preserve this as the default but make the store pluggable"). A trait
//! plus a fully working, independently-testable in-process implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::port::Store;
use crate::types::{
    ApiUsage, BackupConfig, CommandHistory, Conversation, ConversationSummary, GithubIntegration,
    Message, Otp, Server, User, UserApiKey,
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    otps: Vec<Otp>,
    servers: HashMap<String, Server>,
    conversations: HashMap<String, Conversation>,
    messages: HashMap<String, Vec<Message>>,
    summaries: HashMap<String, Vec<ConversationSummary>>,
    command_history: HashMap<String, Vec<CommandHistory>>,
    github_integrations: HashMap<String, GithubIntegration>,
    backup_configs: HashMap<String, BackupConfig>,
    api_usage: Vec<ApiUsage>,
    user_api_keys: HashMap<(String, String), UserApiKey>,
}

/// The default Store Port implementation: a process-local map behind a
/// single lock. Fine for the reference deployment; a durable backend
/// implements the same `Store` trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn create_user(&self, username: &str) -> Result<User> {
        let user = User {
            id: vps_common::new_id(),
            username: username.to_string(),
        };
        self.tables
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn create_otp(&self, user_id: &str, code: &str) -> Result<Otp> {
        let otp = Otp {
            id: vps_common::new_id(),
            user_id: user_id.to_string(),
            code: code.to_string(),
            consumed: false,
            created_at: chrono::Utc::now(),
        };
        self.tables.write().await.otps.push(otp.clone());
        Ok(otp)
    }

    async fn consume_otp(&self, user_id: &str, code: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if let Some(otp) = tables
            .otps
            .iter_mut()
            .find(|o| o.user_id == user_id && o.code == code && !o.consumed)
        {
            otp.consumed = true;
            return Ok(true);
        }
        Ok(false)
    }

    async fn create_server(&self, server: Server) -> Result<Server> {
        self.tables
            .write()
            .await
            .servers
            .insert(server.id.clone(), server.clone());
        Ok(server)
    }

    async fn get_server(&self, server_id: &str) -> Result<Option<Server>> {
        Ok(self.tables.read().await.servers.get(server_id).cloned())
    }

    async fn list_servers(&self, user_id: &str) -> Result<Vec<Server>> {
        Ok(self
            .tables
            .read()
            .await
            .servers
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_server(&self, server: Server) -> Result<Server> {
        self.tables
            .write()
            .await
            .servers
            .insert(server.id.clone(), server.clone());
        Ok(server)
    }

    async fn delete_server(&self, server_id: &str) -> Result<()> {
        self.tables.write().await.servers.remove(server_id);
        Ok(())
    }

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.tables
            .write()
            .await
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .tables
            .read()
            .await
            .conversations
            .get(conversation_id)
            .cloned())
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        Ok(self
            .tables
            .read()
            .await
            .conversations
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.tables
            .write()
            .await
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn append_message(&self, message: Message) -> Result<Message> {
        self.tables
            .write()
            .await
            .messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut messages = self
            .tables
            .read()
            .await
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        // §3 invariant: totally ordered by createdAt.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn append_conversation_summary(
        &self,
        summary: ConversationSummary,
    ) -> Result<ConversationSummary> {
        self.tables
            .write()
            .await
            .summaries
            .entry(summary.conversation_id.clone())
            .or_default()
            .push(summary.clone());
        Ok(summary)
    }

    async fn list_conversation_summaries(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationSummary>> {
        Ok(self
            .tables
            .read()
            .await
            .summaries
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_command_history(&self, entry: CommandHistory) -> Result<CommandHistory> {
        self.tables
            .write()
            .await
            .command_history
            .entry(entry.vps_server_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn list_command_history(
        &self,
        vps_server_id: &str,
        limit: usize,
    ) -> Result<Vec<CommandHistory>> {
        let tables = self.tables.read().await;
        let mut history = tables
            .command_history
            .get(vps_server_id)
            .cloned()
            .unwrap_or_default();
        history.sort_by_key(|h| h.executed_at);
        if history.len() > limit {
            history = history.split_off(history.len() - limit);
        }
        Ok(history)
    }

    async fn get_github_integration(&self, user_id: &str) -> Result<Option<GithubIntegration>> {
        Ok(self
            .tables
            .read()
            .await
            .github_integrations
            .get(user_id)
            .cloned())
    }

    async fn create_github_integration(
        &self,
        integration: GithubIntegration,
    ) -> Result<GithubIntegration> {
        self.tables
            .write()
            .await
            .github_integrations
            .insert(integration.user_id.clone(), integration.clone());
        Ok(integration)
    }

    async fn update_github_integration(
        &self,
        integration: GithubIntegration,
    ) -> Result<GithubIntegration> {
        self.create_github_integration(integration).await
    }

    async fn delete_github_integration(&self, user_id: &str) -> Result<()> {
        self.tables.write().await.github_integrations.remove(user_id);
        Ok(())
    }

    async fn list_backup_configs(&self, vps_server_id: &str) -> Result<Vec<BackupConfig>> {
        Ok(self
            .tables
            .read()
            .await
            .backup_configs
            .values()
            .filter(|b| b.vps_server_id == vps_server_id)
            .cloned()
            .collect())
    }

    async fn get_backup_config(&self, id: &str) -> Result<Option<BackupConfig>> {
        Ok(self.tables.read().await.backup_configs.get(id).cloned())
    }

    async fn create_backup_config(&self, config: BackupConfig) -> Result<BackupConfig> {
        self.tables
            .write()
            .await
            .backup_configs
            .insert(config.id.clone(), config.clone());
        Ok(config)
    }

    async fn append_api_usage(&self, usage: ApiUsage) -> Result<ApiUsage> {
        self.tables.write().await.api_usage.push(usage.clone());
        Ok(usage)
    }

    async fn get_user_api_key(&self, user_id: &str, provider: &str) -> Result<Option<UserApiKey>> {
        Ok(self
            .tables
            .read()
            .await
            .user_api_keys
            .get(&(user_id.to_string(), provider.to_string()))
            .cloned())
    }

    async fn set_user_api_key(&self, key: UserApiKey) -> Result<UserApiKey> {
        self.tables
            .write()
            .await
            .user_api_keys
            .insert((key.user_id.clone(), key.provider.clone()), key.clone());
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthMethod, ConversationMode, MessageRole};

    fn sample_server(user_id: &str) -> Server {
        Server {
            id: vps_common::new_id(),
            user_id: user_id.to_string(),
            host: "203.0.113.5".into(),
            port: 22,
            username: "root".into(),
            auth_method: AuthMethod::Key,
            encrypted_credential: "iv:tag:ct".into(),
            last_connected_at: None,
        }
    }

    #[tokio::test]
    async fn server_crud_round_trips() {
        let store = InMemoryStore::new();
        let server = sample_server("user-1");
        store.create_server(server.clone()).await.unwrap();

        let fetched = store.get_server(&server.id).await.unwrap().unwrap();
        assert_eq!(fetched.host, server.host);

        let listed = store.list_servers("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);

        store.delete_server(&server.id).await.unwrap();
        assert!(store.get_server(&server.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn messages_are_returned_in_created_at_order() {
        let store = InMemoryStore::new();
        let conv_id = vps_common::new_id();
        let now = chrono::Utc::now();

        for (i, offset) in [2, 0, 1].into_iter().enumerate() {
            store
                .append_message(Message {
                    id: format!("m{i}"),
                    conversation_id: conv_id.clone(),
                    role: MessageRole::User,
                    content: format!("msg-{offset}"),
                    attachments: vec![],
                    metadata: None,
                    created_at: now + chrono::Duration::seconds(offset),
                })
                .await
                .unwrap();
        }

        let messages = store.list_messages(&conv_id).await.unwrap();
        assert_eq!(
            messages.iter().map(|m| m.content.clone()).collect::<Vec<_>>(),
            vec!["msg-0", "msg-1", "msg-2"]
        );
    }

    #[tokio::test]
    async fn user_api_key_round_trips_per_provider() {
        let store = InMemoryStore::new();
        store
            .set_user_api_key(UserApiKey {
                user_id: "user-1".into(),
                provider: "anthropic".into(),
                encrypted_key: "iv:ct".into(),
            })
            .await
            .unwrap();

        let fetched = store.get_user_api_key("user-1", "anthropic").await.unwrap().unwrap();
        assert_eq!(fetched.encrypted_key, "iv:ct");
        assert!(store.get_user_api_key("user-1", "perplexity").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn otp_consumed_once() {
        let store = InMemoryStore::new();
        store.create_otp("user-1", "123456").await.unwrap();
        assert!(store.consume_otp("user-1", "123456").await.unwrap());
        assert!(!store.consume_otp("user-1", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn conversation_mode_round_trips() {
        let store = InMemoryStore::new();
        let conv = Conversation {
            id: vps_common::new_id(),
            user_id: "user-1".into(),
            vps_server_id: None,
            title: "new chat".into(),
            mode: ConversationMode::Agent,
            parent_conversation_id: None,
            context_summary: None,
            archive_url: None,
            archived_at: None,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        store.create_conversation(conv.clone()).await.unwrap();
        let fetched = store.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(fetched.mode, ConversationMode::Agent);
    }
}
