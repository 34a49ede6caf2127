//! §4.5 step 1: "Resolve API keys via user settings with environment
//! fallback." User keys are vault-encrypted (§4.1, CBC scheme); env vars
//! are the deployment-wide fallback (§6).

use std::env;

use vps_store::Store;
use vps_vault::Vault;

/// Resolves the Anthropic API key: the user's own key if they've configured
/// one, else `ANTHROPIC_API_KEY`.
pub async fn resolve_anthropic_key(store: &dyn Store, vault: &Vault, user_id: &str) -> Option<String> {
    resolve(store, vault, user_id, "anthropic", "ANTHROPIC_API_KEY").await
}

/// Resolves the Perplexity (research) API key the same way.
pub async fn resolve_perplexity_key(store: &dyn Store, vault: &Vault, user_id: &str) -> Option<String> {
    resolve(store, vault, user_id, "perplexity", "PERPLEXITY_API_KEY").await
}

async fn resolve(store: &dyn Store, vault: &Vault, user_id: &str, provider: &str, env_var: &str) -> Option<String> {
    match store.get_user_api_key(user_id, provider).await {
        Ok(Some(key)) => match vault.decrypt_api_key(&key.encrypted_key) {
            Ok(plaintext) => return Some(plaintext.to_string()),
            Err(e) => tracing::warn!(error = %e, provider, "stored API key failed to decrypt; falling back to env"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, provider, "store lookup failed while resolving API key"),
    }
    env::var(env_var).ok()
}
