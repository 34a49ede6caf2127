//! Conversation memory compression and prompt trimming (§4.5 step 7, §8).

use serde_json::{json, Value};
use vps_llm::{CompleteRequest, ContentBlock, LlmProvider};
use vps_store::types::{ConversationSummary, Message, MessageRole};

use crate::error::Result;

/// History longer than this many live messages triggers compression (§4.5).
pub const COMPRESSION_THRESHOLD: usize = 50;
/// Number of most-recent messages kept verbatim when compressing.
pub const KEEP_VERBATIM: usize = 10;
/// Hard ceiling on the estimated token count of the final prompt (§4.5, §8).
pub const MAX_PROMPT_TOKENS: usize = 100_000;

/// `estimate(s) = ceil(len(s)/4)` (§4.5).
#[must_use]
pub fn estimate_tokens(s: &str) -> usize {
    s.len().div_ceil(4)
}

fn role_str(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        // System-role messages never appear in the LLM-facing history; the
        // system prompt is threaded separately (§4.5 step 5).
        MessageRole::System => "user",
    }
}

fn to_value(message: &Message) -> Value {
    json!({"role": role_str(message.role), "content": message.content})
}

/// Produces a compression summary of `to_summarize` via the LLM, the shape
/// §4.5 step 7 calls for. Returns the summary text; callers persist it as a
/// `ConversationSummary` and splice it into the prompt.
pub async fn summarize(provider: &dyn LlmProvider, to_summarize: &[Message]) -> Result<String> {
    let transcript = to_summarize
        .iter()
        .map(|m| format!("{}: {}", role_str(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let request = CompleteRequest {
        model: provider.model_id().to_string(),
        system: "Summarize the following conversation concisely, preserving any facts, \
                 decisions, or commands that later turns may need to reference."
            .to_string(),
        messages: vec![json!({"role": "user", "content": transcript})],
        tools: None,
        thinking: false,
        max_tokens: 1024,
    };

    let response = provider.complete(request).await?;
    let text = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolUse { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(text)
}

/// Builds the message-range label used on the persisted `ConversationSummary`
/// (§3, §8 scenario 6: `"1-50"` for 60 messages with the last 10 kept live).
#[must_use]
pub fn message_range_label(total: usize, summarized_count: usize) -> String {
    let _ = total;
    format!("1-{summarized_count}")
}

/// Builds a `ConversationSummary` ready to persist.
#[must_use]
pub fn build_summary(conversation_id: &str, summary: &str, total: usize, summarized_count: usize) -> ConversationSummary {
    ConversationSummary {
        id: vps_common::new_id(),
        conversation_id: conversation_id.to_string(),
        summary: summary.to_string(),
        message_range: message_range_label(total, summarized_count),
        token_count: estimate_tokens(summary) as u32,
    }
}

/// Applies §4.5 step 7 in full: if `history` exceeds
/// [`COMPRESSION_THRESHOLD`], summarizes all but the last [`KEEP_VERBATIM`]
/// messages and splices in a synthetic `(user: summary)(assistant: ack)`
/// pair in their place. Otherwise returns the history unchanged. Either way,
/// the result is then trimmed to [`MAX_PROMPT_TOKENS`].
pub async fn build_conversation_messages(
    provider: &dyn LlmProvider,
    conversation_id: &str,
    history: &[Message],
) -> Result<(Vec<Value>, Option<ConversationSummary>)> {
    if history.len() <= COMPRESSION_THRESHOLD {
        let messages = history.iter().map(to_value).collect();
        return Ok((trim_to_budget(messages), None));
    }

    let split_at = history.len() - KEEP_VERBATIM;
    let (to_summarize, kept) = history.split_at(split_at);
    let summary_text = summarize(provider, to_summarize).await?;
    let summary = build_summary(conversation_id, &summary_text, history.len(), to_summarize.len());

    let mut messages = vec![
        json!({"role": "user", "content": format!("(previous conversation summary: {summary_text})")}),
        json!({"role": "assistant", "content": "(acknowledged — continuing with the summarized context above)"}),
    ];
    messages.extend(kept.iter().map(to_value));

    Ok((trim_to_budget(messages), Some(summary)))
}

/// Drops the oldest messages until the estimated token sum is within
/// [`MAX_PROMPT_TOKENS`] (§4.5, §8 invariant). Never drops below a single
/// message so the current turn always has something to answer.
fn trim_to_budget(mut messages: Vec<Value>) -> Vec<Value> {
    fn content_len(message: &Value) -> usize {
        message.get("content").and_then(Value::as_str).map_or(0, estimate_tokens)
    }

    let mut total: usize = messages.iter().map(content_len).sum();
    while total > MAX_PROMPT_TOKENS && messages.len() > 1 {
        let dropped = messages.remove(0);
        total -= content_len(&dropped);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vps_llm::mock::MockProvider;
    use vps_llm::{CompleteResponse, Usage};

    fn message(role: MessageRole, content: &str) -> Message {
        Message {
            id: vps_common::new_id(),
            conversation_id: "c1".into(),
            role,
            content: content.to_string(),
            attachments: vec![],
            metadata: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[tokio::test]
    async fn history_under_threshold_is_untouched() {
        let provider = MockProvider::new("claude-sonnet", vec![]);
        let history: Vec<Message> = (0..10).map(|i| message(MessageRole::User, &format!("m{i}"))).collect();
        let (messages, summary) = build_conversation_messages(&provider, "c1", &history).await.unwrap();
        assert_eq!(messages.len(), 10);
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn history_over_threshold_compresses_all_but_last_ten() {
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text {
                    text: "summary text".into(),
                }],
                usage: Usage::default(),
            }],
        );
        let history: Vec<Message> = (0..60).map(|i| message(MessageRole::User, &format!("m{i}"))).collect();
        let (messages, summary) = build_conversation_messages(&provider, "c1", &history).await.unwrap();

        let summary = summary.unwrap();
        assert_eq!(summary.message_range, "1-50");
        // synthetic pair + last 10 kept verbatim.
        assert_eq!(messages.len(), 2 + 10);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[test]
    fn trim_to_budget_drops_oldest_first() {
        let big = "x".repeat(MAX_PROMPT_TOKENS * 4 + 40);
        let messages = vec![
            json!({"role": "user", "content": big}),
            json!({"role": "user", "content": "recent"}),
        ];
        let trimmed = trim_to_budget(messages);
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0]["content"], "recent");
    }
}
