//! System prompt assembly (§4.5 step 5): server context, GitHub context,
//! recent commands, and the research appendix (if present).

use vps_research::ResearchResult;
use vps_store::types::{CommandHistory, GithubIntegration, Server};

const BASE_PROMPT: &str = "You are an autonomous VPS operations agent. You can inspect and modify \
remote Linux hosts over SSH using the tools available to you. Dangerous operations require \
explicit human approval before they run — when a tool call comes back with \
`requires_approval`, stop and wait; do not attempt to route around it.";

/// Builds the full system prompt for one agent-loop turn.
#[must_use]
pub fn build_system_prompt(
    server: Option<&Server>,
    github: Option<&GithubIntegration>,
    recent_commands: &[CommandHistory],
    research: Option<&ResearchResult>,
) -> String {
    let mut sections = vec![BASE_PROMPT.to_string()];

    if let Some(server) = server {
        sections.push(format!(
            "## Server\nTarget host: {}:{} as {}.",
            server.host, server.port, server.username
        ));
    }

    if let Some(github) = github {
        let branch = github.default_branch.as_deref().unwrap_or("main");
        sections.push(format!(
            "## GitHub integration\nA GitHub token is configured for this user; default branch is `{branch}`. \
             Use the `github_*` tools rather than asking the user to paste diffs."
        ));
    }

    if !recent_commands.is_empty() {
        let lines = recent_commands
            .iter()
            .rev()
            .take(10)
            .map(|c| {
                let marker = if c.exit_code == 0 { "ok" } else { "FAILED" };
                format!("- `{}` [{marker}, exit {}]", c.command, c.exit_code)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("## Recent commands on this server\n{lines}"));
    }

    if let Some(research) = research {
        if !research.answer.is_empty() {
            sections.push(format!(
                "## Research\n{}\n\nCitations: {}",
                research.answer,
                research.citations.join(", ")
            ));
        }
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vps_store::types::AuthMethod;

    #[test]
    fn base_prompt_alone_with_no_context() {
        let prompt = build_system_prompt(None, None, &[], None);
        assert!(prompt.contains("autonomous VPS operations agent"));
        assert!(!prompt.contains("## Server"));
    }

    #[test]
    fn server_section_included_when_present() {
        let server = Server {
            id: "s1".into(),
            user_id: "u1".into(),
            host: "203.0.113.5".into(),
            port: 22,
            username: "root".into(),
            auth_method: AuthMethod::Key,
            encrypted_credential: "iv:tag:ct".into(),
            last_connected_at: None,
        };
        let prompt = build_system_prompt(Some(&server), None, &[], None);
        assert!(prompt.contains("203.0.113.5:22"));
    }

    #[test]
    fn recent_commands_are_capped_at_ten_most_recent() {
        let history: Vec<CommandHistory> = (0..15)
            .map(|i| CommandHistory {
                user_id: "u1".into(),
                vps_server_id: "s1".into(),
                command: format!("cmd-{i}"),
                output: String::new(),
                exit_code: 0,
                executed_at: chrono::Utc::now(),
            })
            .collect();
        let prompt = build_system_prompt(None, None, &history, None);
        let count = prompt.matches("cmd-").count();
        assert_eq!(count, 10);
        assert!(prompt.contains("cmd-14"), "most recent command should be present");
    }
}
