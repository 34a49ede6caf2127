//! Completion suggestions (§4.7 "Suggestions"): a static local catalog plus
//! an optional AI pass for longer partials.

use vps_llm::{CompleteRequest, ContentBlock, LlmProvider};

const LOCAL_MAX: usize = 8;
const AI_MAX: usize = 5;
/// Partials shorter than this skip the AI pass entirely (§4.7).
const AI_MIN_PARTIAL_LEN: usize = 3;

/// ~24 common commands a VPS operator types; prefix-matched against the
/// in-progress partial.
const COMMON_COMMANDS: &[&str] = &[
    "ls", "ls -la", "cd", "pwd", "cat", "tail -f", "grep", "ps aux", "top", "htop", "df -h",
    "du -sh", "systemctl status", "systemctl restart", "journalctl -xe", "docker ps",
    "docker logs", "docker compose up -d", "nginx -t", "nginx -s reload", "ufw status",
    "netstat -tulpn", "whoami", "uname -a",
];

/// Local, static prefix-match suggestions (§4.7: "static catalog lookup +
/// prefix match ... up to 8 entries").
#[must_use]
pub fn local_suggestions(partial: &str) -> Vec<String> {
    if partial.is_empty() {
        return Vec::new();
    }
    COMMON_COMMANDS
        .iter()
        .filter(|cmd| cmd.starts_with(partial))
        .take(LOCAL_MAX)
        .map(|s| (*s).to_string())
        .collect()
}

/// Whether `partial` is long enough to warrant firing an AI completion
/// request in parallel with the local lookup (§4.7).
#[must_use]
pub fn should_ask_ai(partial: &str) -> bool {
    partial.chars().count() >= AI_MIN_PARTIAL_LEN
}

/// Asks `provider` for up to 5 shell-command completions of `partial`
/// (§4.7, second `suggestions` event with `source: "ai"`).
pub async fn ai_suggestions(provider: &dyn LlmProvider, partial: &str) -> Vec<String> {
    let request = CompleteRequest {
        model: provider.model_id().to_string(),
        system: "You complete partially-typed Linux shell commands. Reply with up to 5 \
                 complete command lines, one per line, no numbering, no prose."
            .to_string(),
        messages: vec![serde_json::json!({"role": "user", "content": partial})],
        tools: None,
        thinking: false,
        max_tokens: 256,
    };

    let response = match provider.complete(request).await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "ai suggestion call failed");
            return Vec::new();
        }
    };

    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolUse { .. } => None,
        })
        .flat_map(|text| text.lines().map(str::trim).map(str::to_string).collect::<Vec<_>>())
        .filter(|line| !line.is_empty())
        .take(AI_MAX)
        .collect()
}

/// Asks `provider` a short free-text question about the terminal session
/// (§4.7 `ai-help`).
pub async fn ai_help(provider: &dyn LlmProvider, question: &str) -> String {
    let request = CompleteRequest {
        model: provider.model_id().to_string(),
        system: "You are a concise Linux sysadmin assistant helping inside an interactive SSH \
                 terminal session. Answer in at most a few sentences."
            .to_string(),
        messages: vec![serde_json::json!({"role": "user", "content": question})],
        tools: None,
        thinking: false,
        max_tokens: 512,
    };

    match provider.complete(request).await {
        Ok(response) => response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::ToolUse { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => {
            tracing::debug!(error = %e, "ai-help call failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vps_llm::mock::MockProvider;
    use vps_llm::{CompleteResponse, Usage};

    #[test]
    fn local_suggestions_prefix_matches_and_caps_at_eight() {
        let suggestions = local_suggestions("d");
        assert!(suggestions.contains(&"df -h".to_string()));
        assert!(suggestions.len() <= 8);
    }

    #[test]
    fn empty_partial_yields_no_local_suggestions() {
        assert!(local_suggestions("").is_empty());
    }

    #[test]
    fn short_partial_does_not_warrant_ai_pass() {
        assert!(!should_ask_ai("d"));
        assert!(!should_ask_ai("do"));
        assert!(should_ask_ai("doc"));
    }

    #[tokio::test]
    async fn ai_suggestions_are_split_by_line_and_capped_at_five() {
        let text = (0..8).map(|i| format!("cmd{i}")).collect::<Vec<_>>().join("\n");
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text { text }],
                usage: Usage::default(),
            }],
        );
        let suggestions = ai_suggestions(&provider, "doc").await;
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0], "cmd0");
    }
}
