//! C5 Agent Loop (§4.5): LLM tool-use iteration interleaving model calls,
//! tool dispatch, and streamed deltas, with memory compression.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use vps_catalog::Catalog;
use vps_dispatcher::{DispatchContext, Dispatcher};
use vps_llm::{CompleteRequest, ContentBlock, LlmProvider};
use vps_research::ResearchGateway;
use vps_stream::StreamSink;
use vps_store::types::{
    Conversation, ConversationMode, Message, MessageMetadata, MessageRole,
};
use vps_store::Store;
use vps_vault::Vault;

use crate::cancellation::Cancellation;
use crate::error::{AgentError, Result};
use crate::events;
use crate::memory::build_conversation_messages;
use crate::pricing::estimate_cost;
use crate::prompt::build_system_prompt;
use crate::request::AgentRequest;

/// Bounds the agent loop's model-call iterations (§4.5 step 8, §8).
pub const MAX_ITERATIONS: u32 = 10;
/// `maxTokens` sent on every LLM call (§4.5 step 8).
pub const MAX_TOKENS: u32 = 8192;

pub struct AgentLoop {
    pub store: Arc<dyn Store>,
    pub vault: Arc<Vault>,
    pub catalog: Arc<Catalog>,
    pub dispatcher: Arc<Dispatcher>,
    pub research: Arc<ResearchGateway>,
}

impl AgentLoop {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        vault: Arc<Vault>,
        catalog: Arc<Catalog>,
        dispatcher: Arc<Dispatcher>,
        research: Arc<ResearchGateway>,
    ) -> Self {
        Self {
            store,
            vault,
            catalog,
            dispatcher,
            research,
        }
    }

    /// Runs one full agent turn, streaming every delta onto `sink` per
    /// §4.5. The `provider` is the already-resolved LLM client for the
    /// requested model (resolving API keys and constructing it is the
    /// gateway's job — see `vps-gateway`).
    pub async fn run(
        &self,
        request: AgentRequest,
        provider: &dyn LlmProvider,
        sink: &dyn StreamSink,
        cancel: &Cancellation,
    ) -> Result<()> {
        let conversation = self.resolve_conversation(&request).await?;
        sink.emit(events::conversation_id(&conversation.id)).await?;

        let user_message = Message {
            id: vps_common::new_id(),
            conversation_id: conversation.id.clone(),
            role: MessageRole::User,
            content: request.content.clone(),
            attachments: request.attachments.clone(),
            metadata: None,
            created_at: Utc::now(),
        };
        self.store.append_message(user_message).await?;

        let research_result = if request.enable_research {
            sink.emit(events::research_status(true)).await?;
            let result = self.research.query(&request.content).await;
            if let Some(usage) = result.usage {
                let _ = self
                    .store
                    .append_api_usage(vps_store::types::ApiUsage {
                        user_id: request.user_id.clone(),
                        conversation_id: Some(conversation.id.clone()),
                        model: ResearchGateway::model_id().to_string(),
                        input_tokens: usage.input_tokens,
                        output_tokens: usage.output_tokens,
                        total_tokens: usage.input_tokens + usage.output_tokens,
                        estimated_cost: estimate_cost(ResearchGateway::model_id(), usage.input_tokens, usage.output_tokens),
                        recorded_at: Utc::now(),
                    })
                    .await;
            }
            sink.emit(events::research_status(false)).await?;
            Some(result)
        } else {
            None
        };

        let server = match &conversation.vps_server_id {
            Some(id) => self.store.get_server(id).await?,
            None => None,
        };
        let github = self.store.get_github_integration(&request.user_id).await?;
        let recent_commands = match &server {
            Some(s) => self.store.list_command_history(&s.id, 10).await?,
            None => Vec::new(),
        };
        let system_prompt = build_system_prompt(server.as_ref(), github.as_ref(), &recent_commands, research_result.as_ref());

        let history = self.store.list_messages(&conversation.id).await?;
        let (mut messages, summary) = build_conversation_messages(provider, &conversation.id, &history).await?;
        if let Some(summary) = summary {
            self.store.append_conversation_summary(summary).await?;
        }

        let tools = tools_for_llm(&self.catalog);
        let mut tools_used: Vec<String> = Vec::new();
        let mut total_input_tokens: u32 = 0;
        let mut total_output_tokens: u32 = 0;
        let mut full_response = String::new();
        let mut iterations: u32 = 0;
        let mut pending_approval = false;

        'iterate: for i in 1..=MAX_ITERATIONS {
            iterations = i;
            if cancel.is_cancelled() {
                break;
            }
            sink.emit(events::iteration(iterations)).await?;

            let complete_request = CompleteRequest {
                model: provider.model_id().to_string(),
                system: system_prompt.clone(),
                messages: messages.clone(),
                tools: Some(tools.clone()),
                thinking: request.enable_thinking,
                max_tokens: MAX_TOKENS,
            };

            let response = provider.complete(complete_request).await?;
            total_input_tokens = total_input_tokens.saturating_add(response.usage.input_tokens);
            total_output_tokens = total_output_tokens.saturating_add(response.usage.output_tokens);

            let mut tool_uses = Vec::new();
            let mut assistant_content: Vec<Value> = Vec::new();

            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => {
                        sink.emit(events::text_delta(text)).await?;
                        full_response.push_str(text);
                        assistant_content.push(json!({"type": "text", "text": text}));
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        assistant_content.push(json!({
                            "type": "tool_use", "id": id, "name": name, "input": input,
                        }));
                        tool_uses.push((id.clone(), name.clone(), input.clone()));
                    }
                }
            }

            if tool_uses.is_empty() {
                break 'iterate;
            }

            messages.push(json!({"role": "assistant", "content": assistant_content}));

            let mut tool_result_content: Vec<Value> = Vec::new();
            for (id, name, input) in tool_uses {
                sink.emit(events::tool_executing(&name, &input)).await?;
                tools_used.push(name.clone());

                let context = self.build_dispatch_context(&request, server.clone(), github.as_ref()).await;
                let started = Instant::now();
                let result = self.dispatcher.dispatch(&name, input, &context).await;

                if result.requires_approval {
                    let pending_command = result.pending_command.clone().unwrap_or_default();
                    let message = result.error.clone().unwrap_or_default();
                    sink.emit(events::tool_requires_approval(&name, &pending_command, &message)).await?;

                    let partial = Message {
                        id: vps_common::new_id(),
                        conversation_id: conversation.id.clone(),
                        role: MessageRole::Assistant,
                        content: full_response.clone(),
                        attachments: vec![],
                        metadata: Some(MessageMetadata {
                            mode: Some("agent".to_string()),
                            tools_used: tools_used.clone(),
                            thinking_present: request.enable_thinking,
                            pending_approval: true,
                            iterations: Some(iterations),
                        }),
                        created_at: Utc::now(),
                    };
                    self.store.append_message(partial).await?;
                    sink.emit(events::pending_approval_done(&conversation.id, &tools_used)).await?;
                    pending_approval = true;
                    break 'iterate;
                }

                let duration_ms = started.elapsed().as_millis();
                sink.emit(events::tool_finished(&name, result.success, duration_ms, &result.output_preview())).await?;

                tool_result_content.push(json!({
                    "type": "tool_result",
                    "tool_use_id": id,
                    "content": if result.success { result.output.clone() } else { result.error.clone().unwrap_or_default() },
                }));
            }

            if !tool_result_content.is_empty() {
                messages.push(json!({"role": "user", "content": tool_result_content}));
            }
        }

        if pending_approval {
            sink.end().await;
            return Ok(());
        }

        sink.emit(events::done(&conversation.id, &tools_used, iterations)).await?;
        sink.end().await;

        let final_message = Message {
            id: vps_common::new_id(),
            conversation_id: conversation.id.clone(),
            role: MessageRole::Assistant,
            content: full_response,
            attachments: vec![],
            metadata: Some(MessageMetadata {
                mode: Some("agent".to_string()),
                tools_used: tools_used.clone(),
                thinking_present: request.enable_thinking,
                pending_approval: false,
                iterations: Some(iterations),
            }),
            created_at: Utc::now(),
        };
        self.store.append_message(final_message).await?;

        self.store
            .append_api_usage(vps_store::types::ApiUsage {
                user_id: request.user_id.clone(),
                conversation_id: Some(conversation.id.clone()),
                model: provider.model_id().to_string(),
                input_tokens: total_input_tokens,
                output_tokens: total_output_tokens,
                total_tokens: total_input_tokens + total_output_tokens,
                estimated_cost: estimate_cost(provider.model_id(), total_input_tokens, total_output_tokens),
                recorded_at: Utc::now(),
            })
            .await?;

        Ok(())
    }

    async fn resolve_conversation(&self, request: &AgentRequest) -> Result<Conversation> {
        if let Some(id) = &request.conversation_id {
            if let Some(existing) = self.store.get_conversation(id).await? {
                return Ok(existing);
            }
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: vps_common::new_id(),
            user_id: request.user_id.clone(),
            vps_server_id: request.server_id.clone(),
            title: truncate_title(&request.content),
            mode: ConversationMode::Agent,
            parent_conversation_id: None,
            context_summary: None,
            archive_url: None,
            archived_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.create_conversation(conversation).await?)
    }

    async fn build_dispatch_context(
        &self,
        request: &AgentRequest,
        server: Option<vps_store::types::Server>,
        github: Option<&vps_store::types::GithubIntegration>,
    ) -> DispatchContext {
        let mut context = DispatchContext::new(request.user_id.clone());
        if let Some(server) = server {
            context = context.with_server(server);
        }
        if let Some(github) = github {
            context = context.with_github_token(github.token.clone());
        }
        context
    }
}

fn truncate_title(content: &str) -> String {
    const MAX: usize = 60;
    if content.chars().count() <= MAX {
        content.to_string()
    } else {
        content.chars().take(MAX).collect::<String>() + "…"
    }
}

/// Converts the catalog's tool schemas into the Anthropic-shaped `tools`
/// array the LLM port's `CompleteRequest.tools` expects (§4.11, §4.5 step 8).
fn tools_for_llm(catalog: &Catalog) -> Vec<Value> {
    catalog
        .list()
        .iter()
        .map(|entry| {
            json!({
                "name": entry.name,
                "description": entry.description,
                "input_schema": entry.input_schema,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vps_llm::mock::MockProvider;
    use vps_llm::{CompleteResponse, Usage};
    use vps_store::InMemoryStore;
    use vps_vault::secret::{ApiKeySecret, EncryptionKeySecret, SessionSecret};
    use vps_vault::Vault;

    fn test_loop(store: Arc<dyn Store>) -> AgentLoop {
        let vault = Arc::new(
            Vault::new(
                &SessionSecret::new("s"),
                &ApiKeySecret::new("a"),
                &EncryptionKeySecret::new("e"),
            )
            .unwrap(),
        );
        let catalog = Arc::new(Catalog::new());
        let dispatcher = Arc::new(Dispatcher::new(catalog.clone(), store.clone(), vault.clone()));
        let research = Arc::new(ResearchGateway::new(None));
        AgentLoop::new(store, vault, catalog, dispatcher, research)
    }

    #[derive(Default)]
    struct CapturingSink {
        frames: tokio::sync::Mutex<Vec<Value>>,
    }

    #[async_trait::async_trait]
    impl StreamSink for CapturingSink {
        async fn emit(&self, obj: Value) -> vps_stream::Result<()> {
            self.frames.lock().await.push(obj);
            Ok(())
        }

        async fn end(&self) {}
    }

    #[tokio::test]
    async fn benign_turn_with_no_tool_calls_completes_in_one_iteration() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let agent_loop = test_loop(store.clone());
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text { text: "Hi there!".into() }],
                usage: Usage { input_tokens: 10, output_tokens: 5 },
            }],
        );
        let sink = CapturingSink::default();
        let request = AgentRequest {
            user_id: "u1".into(),
            content: "hello".into(),
            conversation_id: None,
            server_id: None,
            model: "claude-sonnet".into(),
            enable_thinking: false,
            enable_research: false,
            attachments: vec![],
        };

        agent_loop
            .run(request, &provider, &sink, &Cancellation::new())
            .await
            .unwrap();

        let frames = sink.frames.lock().await;
        assert!(frames.iter().any(|f| f.get("done") == Some(&Value::Bool(true))));
        assert!(!frames.iter().any(|f| f.get("pendingApproval").is_some()));
    }

    #[tokio::test]
    async fn dangerous_tool_call_halts_before_execution_and_marks_pending_approval() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let agent_loop = test_loop(store.clone());
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::ToolUse {
                    id: "call_1".into(),
                    name: "execute_command".into(),
                    input: json!({"command": "rm -rf /var/log", "explanation": "cleanup"}),
                }],
                usage: Usage { input_tokens: 10, output_tokens: 5 },
            }],
        );
        let sink = CapturingSink::default();
        let request = AgentRequest {
            user_id: "u1".into(),
            content: "wipe the logs".into(),
            conversation_id: None,
            server_id: None,
            model: "claude-sonnet".into(),
            enable_thinking: false,
            enable_research: false,
            attachments: vec![],
        };

        agent_loop
            .run(request, &provider, &sink, &Cancellation::new())
            .await
            .unwrap();

        let frames = sink.frames.lock().await;
        assert!(frames.iter().any(|f| f
            .get("toolCall")
            .and_then(|t| t.get("status"))
            .and_then(Value::as_str)
            == Some("requires_approval")));
        assert!(frames.iter().any(|f| f.get("pendingApproval") == Some(&Value::Bool(true))));
    }
}
