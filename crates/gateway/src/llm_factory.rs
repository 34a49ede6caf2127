//! Resolves an `LlmProvider` for a request's `model` id (§4.5 step 1):
//! the user's own Anthropic key if configured, else `ANTHROPIC_API_KEY`.

use vps_agent::api_keys::resolve_anthropic_key;
use vps_llm::AnthropicProvider;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn resolve_provider(state: &AppState, user_id: &str, model: &str) -> Result<AnthropicProvider, ApiError> {
    let api_key = resolve_anthropic_key(state.store.as_ref(), &state.vault, user_id)
        .await
        .ok_or_else(|| ApiError::InputInvalid("no Anthropic API key configured for this user or deployment".to_string()))?;

    Ok(AnthropicProvider::new(api_key, model.to_string()))
}
