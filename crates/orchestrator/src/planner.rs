//! `planTask` (§4.6): asks the LLM to emit a JSON plan. Forgiving: if JSON
//! can't be extracted, falls back to a single-step plan that apologizes and
//! requires approval.

use serde_json::Value;
use vps_llm::{CompleteRequest, ContentBlock, LlmProvider};

use crate::types::{Plan, PlannedStep};

const PLANNER_SYSTEM_PROMPT: &str = "You are a task planner for a VPS operations agent. Given a \
request, emit ONLY a JSON object (no surrounding prose) with this shape:\n\
{\"title\": string, \"description\": string, \"steps\": [{\"name\": string, \"description\": \
string, \"command\": string, \"rollback_command\": string|null, \"requires_approval\": bool, \
\"timeout\": number}], \"estimated_duration\": string|null, \"risks\": [string], \
\"requires_approval\": bool}";

/// Extracts the first balanced `{...}` JSON object from `text`, tolerating
/// surrounding prose or a fenced code block.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// A fallback plan for when the model's output can't be parsed as JSON
/// (§4.6: "the orchestrator is forgiving").
fn fallback_plan(request: &str) -> Plan {
    Plan {
        title: "Manual review needed".to_string(),
        description: format!(
            "I wasn't able to produce a structured plan for \"{request}\". Apologies — please \
             review and approve a single diagnostic step so we can gather more information."
        ),
        steps: vec![PlannedStep {
            name: "inspect".to_string(),
            description: "Gather basic system information before proceeding".to_string(),
            command: "uname -a && uptime".to_string(),
            rollback_command: None,
            requires_approval: true,
            timeout: 30,
        }],
        estimated_duration: None,
        risks: vec!["plan could not be generated automatically".to_string()],
        requires_approval: true,
    }
}

/// Asks `provider` to plan `request` against `server_info` (a short
/// free-text description of the target host). Never fails: a malformed or
/// missing JSON response degrades to [`fallback_plan`].
pub async fn plan_task(provider: &dyn LlmProvider, request: &str, server_info: &str) -> Plan {
    let complete_request = CompleteRequest {
        model: provider.model_id().to_string(),
        system: PLANNER_SYSTEM_PROMPT.to_string(),
        messages: vec![serde_json::json!({
            "role": "user",
            "content": format!("Server: {server_info}\n\nRequest: {request}"),
        })],
        tools: None,
        thinking: false,
        max_tokens: 2048,
    };

    let response = match provider.complete(complete_request).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "planner LLM call failed; using fallback plan");
            return fallback_plan(request);
        }
    };

    let text = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolUse { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let Some(json_str) = extract_json_object(&text) else {
        tracing::warn!("planner response contained no JSON object; using fallback plan");
        return fallback_plan(request);
    };

    match serde_json::from_str::<Value>(json_str).and_then(serde_json::from_value::<Plan>) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!(error = %e, "planner response failed to parse as a Plan; using fallback plan");
            fallback_plan(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vps_llm::mock::MockProvider;
    use vps_llm::{CompleteResponse, Usage};

    #[tokio::test]
    async fn well_formed_json_plan_parses() {
        let json = serde_json::json!({
            "title": "Install nginx",
            "description": "Install and start nginx",
            "steps": [{
                "name": "install",
                "description": "apt install",
                "command": "apt-get install -y nginx",
                "rollback_command": "apt-get remove -y nginx",
                "requires_approval": false,
                "timeout": 120,
            }],
            "estimated_duration": "2m",
            "risks": [],
            "requires_approval": false,
        });
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text { text: json.to_string() }],
                usage: Usage::default(),
            }],
        );

        let plan = plan_task(&provider, "install nginx", "203.0.113.5").await;
        assert_eq!(plan.title, "Install nginx");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].command, "apt-get install -y nginx");
    }

    #[tokio::test]
    async fn plan_embedded_in_prose_is_extracted() {
        let json = r#"{"title": "t", "description": "d", "steps": []}"#;
        let text = format!("Sure, here's the plan:\n```json\n{json}\n```\nLet me know!");
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text { text }],
                usage: Usage::default(),
            }],
        );

        let plan = plan_task(&provider, "do something", "host").await;
        assert_eq!(plan.title, "t");
    }

    #[tokio::test]
    async fn unparseable_response_falls_back_to_single_step_approval_plan() {
        let provider = MockProvider::new(
            "claude-sonnet",
            vec![CompleteResponse {
                content: vec![ContentBlock::Text { text: "I'm not sure how to do that.".into() }],
                usage: Usage::default(),
            }],
        );

        let plan = plan_task(&provider, "do something impossible", "host").await;
        assert_eq!(plan.steps.len(), 1);
        assert!(plan.requires_approval);
    }
}
