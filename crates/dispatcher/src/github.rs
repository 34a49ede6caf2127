//! GitHub family tools (§4.3, §6): HTTPS calls to `api.github.com` using a
//! per-user token from the Store.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::result::ToolResult;

const USER_AGENT: &str = "vps-agent";
const ACCEPT: &str = "application/vnd.github.v3+json";

fn s(input: &Value, field: &str) -> String {
    input.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Executes a `github_*` tool over HTTPS. Returns `None` if `tool_name`
/// isn't a GitHub-family tool.
pub async fn dispatch(
    client: &reqwest::Client,
    token: &str,
    tool_name: &str,
    input: &Value,
) -> Option<ToolResult> {
    let result = match tool_name {
        "github_search_repos" => {
            get(client, token, "/search/repositories", &[("q", &s(input, "query"))]).await
        }
        "github_get_repo" => {
            get_path(client, token, &format!("/repos/{}/{}", s(input, "owner"), s(input, "repo"))).await
        }
        "github_list_contents" => {
            get_path(
                client,
                token,
                &format!(
                    "/repos/{}/{}/contents/{}",
                    s(input, "owner"),
                    s(input, "repo"),
                    s(input, "path")
                ),
            )
            .await
        }
        "github_get_file" => {
            get_path(
                client,
                token,
                &format!(
                    "/repos/{}/{}/contents/{}",
                    s(input, "owner"),
                    s(input, "repo"),
                    s(input, "path")
                ),
            )
            .await
        }
        "github_search_code" => {
            get(client, token, "/search/code", &[("q", &s(input, "query"))]).await
        }
        "github_list_commits" => {
            get_path(client, token, &format!("/repos/{}/{}/commits", s(input, "owner"), s(input, "repo"))).await
        }
        "github_list_branches" => {
            get_path(client, token, &format!("/repos/{}/{}/branches", s(input, "owner"), s(input, "repo"))).await
        }
        "github_list_issues" => {
            get_path(client, token, &format!("/repos/{}/{}/issues", s(input, "owner"), s(input, "repo"))).await
        }
        "github_list_pull_requests" => {
            get_path(client, token, &format!("/repos/{}/{}/pulls", s(input, "owner"), s(input, "repo"))).await
        }
        "github_create_issue" => {
            post(
                client,
                token,
                &format!("/repos/{}/{}/issues", s(input, "owner"), s(input, "repo")),
                &json!({"title": s(input, "title"), "body": s(input, "body")}),
            )
            .await
        }
        "github_create_file" => create_or_update_file(client, token, input).await,
        _ => return None,
    };

    Some(result)
}

async fn create_or_update_file(client: &reqwest::Client, token: &str, input: &Value) -> ToolResult {
    let owner = s(input, "owner");
    let repo = s(input, "repo");
    let path = s(input, "path");
    let url = format!("https://api.github.com/repos/{owner}/{repo}/contents/{path}");

    let existing = client
        .get(&url)
        .bearer_auth(token)
        .header("Accept", ACCEPT)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .ok();

    let mut existing_sha = None;
    if let Some(response) = existing {
        if response.status().is_success() {
            if let Ok(body) = response.json::<Value>().await {
                existing_sha = body.get("sha").and_then(Value::as_str).map(str::to_string);
            }
        }
    }

    let mut body = json!({
        "message": s(input, "message"),
        "content": STANDARD.encode(s(input, "content")),
    });
    if let Some(sha) = existing_sha {
        body["sha"] = json!(sha);
    }
    if let Some(branch) = input.get("branch").and_then(Value::as_str) {
        body["branch"] = json!(branch);
    }

    match client
        .put(&url)
        .bearer_auth(token)
        .header("Accept", ACCEPT)
        .header("User-Agent", USER_AGENT)
        .json(&body)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => ToolResult::ok(format!("wrote {path}")),
        Ok(response) => {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            ToolResult::err(format!("GitHub API error {status}: {text}"))
        }
        Err(e) => ToolResult::err(format!("GitHub request failed: {e}")),
    }
}

async fn get_path(client: &reqwest::Client, token: &str, path: &str) -> ToolResult {
    get(client, token, path, &[]).await
}

async fn get(client: &reqwest::Client, token: &str, path: &str, query: &[(&str, &str)]) -> ToolResult {
    let mut request = client
        .get(format!("https://api.github.com{path}"))
        .bearer_auth(token)
        .header("Accept", ACCEPT)
        .header("User-Agent", USER_AGENT);
    if !query.is_empty() {
        request = request.query(query);
    }

    match request.send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ToolResult::ok(body),
            Err(e) => ToolResult::err(format!("failed to read GitHub response: {e}")),
        },
        Ok(response) => {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            ToolResult::err(format!("GitHub API error {status}: {text}"))
        }
        Err(e) => ToolResult::err(format!("GitHub request failed: {e}")),
    }
}

async fn post(client: &reqwest::Client, token: &str, path: &str, body: &Value) -> ToolResult {
    match client
        .post(format!("https://api.github.com{path}"))
        .bearer_auth(token)
        .header("Accept", ACCEPT)
        .header("User-Agent", USER_AGENT)
        .json(body)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ToolResult::ok(body),
            Err(e) => ToolResult::err(format!("failed to read GitHub response: {e}")),
        },
        Ok(response) => {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            ToolResult::err(format!("GitHub API error {status}: {text}"))
        }
        Err(e) => ToolResult::err(format!("GitHub request failed: {e}")),
    }
}
