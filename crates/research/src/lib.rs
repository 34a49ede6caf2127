//! C8 Research Gateway (§4.8): adapter to an external web-search completion
//! API. Never throws — missing key or HTTP error both degrade to an empty
//! result so the agent loop's system-prompt assembly never blocks on it.

use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const RESEARCH_MODEL: &str = "perplexity-small";

#[derive(Debug, Clone, Default)]
pub struct ResearchResult {
    pub answer: String,
    pub citations: Vec<String>,
    pub usage: Option<ResearchUsage>,
}

#[derive(Debug, Clone, Copy)]
pub struct ResearchUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

pub struct ResearchGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ResearchGateway {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// The model id to record in `ApiUsage` for research calls (§4.8).
    #[must_use]
    pub fn model_id() -> &'static str {
        RESEARCH_MODEL
    }

    /// Queries the research backend. Never returns `Err` — on missing key
    /// or HTTP failure it returns an empty result (§4.8).
    pub async fn query(&self, query: &str) -> ResearchResult {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("research gateway has no API key configured; returning empty result");
            return ResearchResult::default();
        };

        let body = json!({
            "model": RESEARCH_MODEL,
            "messages": [{"role": "user", "content": query}],
        });

        let response = match self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "research gateway request failed");
                return ResearchResult::default();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "research gateway returned an error status");
            return ResearchResult::default();
        }

        match response.json::<PerplexityResponse>().await {
            Ok(parsed) => parsed.into(),
            Err(e) => {
                tracing::warn!(error = %e, "research gateway returned an unparseable body");
                ResearchResult::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PerplexityResponse {
    choices: Vec<PerplexityChoice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    usage: Option<PerplexityUsage>,
}

#[derive(Debug, Deserialize)]
struct PerplexityChoice {
    message: PerplexityMessage,
}

#[derive(Debug, Deserialize)]
struct PerplexityMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct PerplexityUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl From<PerplexityResponse> for ResearchResult {
    fn from(value: PerplexityResponse) -> Self {
        ResearchResult {
            answer: value
                .choices
                .first()
                .map(|c| c.message.content.clone())
                .unwrap_or_default(),
            citations: value.citations,
            usage: value.usage.map(|u| ResearchUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_returns_empty_result_without_erroring() {
        let gateway = ResearchGateway::new(None);
        let result = gateway.query("what is the latest Debian LTS?").await;
        assert_eq!(result.answer, "");
        assert!(result.citations.is_empty());
        assert!(result.usage.is_none());
    }
}
