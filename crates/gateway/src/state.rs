//! Services container (§9 "Global mutable singletons"): wraps the sessions
//! map, active tasks map, and event bus behind one struct with explicit
//! construction, so tests (and future alternate entry points) can build
//! isolated instances instead of reaching for process-wide statics.

use std::env;
use std::sync::Arc;

use vps_agent::AgentLoop;
use vps_catalog::Catalog;
use vps_dispatcher::Dispatcher;
use vps_orchestrator::{EventBus, InMemoryTaskStore, Orchestrator};
use vps_research::ResearchGateway;
use vps_store::{InMemoryStore, Store};
use vps_terminal::TerminalSessions;
use vps_vault::secret::{ApiKeySecret, EncryptionKeySecret, SessionSecret};
use vps_vault::Vault;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub vault: Arc<Vault>,
    pub catalog: Arc<Catalog>,
    pub dispatcher: Arc<Dispatcher>,
    pub agent_loop: Arc<AgentLoop>,
    pub orchestrator: Arc<Orchestrator>,
    pub terminal: TerminalSessions,
}

impl AppState {
    /// Builds the full services container. `SESSION_SECRET` absence
    /// triggers a loud development-fallback warning (§6); the other two
    /// vault secrets behave the same way.
    #[must_use]
    pub fn init(config: Config) -> Self {
        let session_secret = secret_or_dev_fallback("SESSION_SECRET");
        let api_key_secret = secret_or_dev_fallback("API_KEY_ENCRYPTION_SECRET");
        let encryption_key_secret = secret_or_dev_fallback("ENCRYPTION_KEY");

        let vault = Arc::new(
            Vault::new(
                &SessionSecret::new(session_secret),
                &ApiKeySecret::new(api_key_secret),
                &EncryptionKeySecret::new(encryption_key_secret),
            )
            .expect("vault key derivation must succeed"),
        );

        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(Catalog::new());
        let dispatcher = Arc::new(Dispatcher::new(catalog.clone(), store.clone(), vault.clone()));
        let research = Arc::new(ResearchGateway::new(env::var("PERPLEXITY_API_KEY").ok()));
        let agent_loop = Arc::new(AgentLoop::new(store.clone(), vault.clone(), catalog.clone(), dispatcher.clone(), research));

        let task_store = Arc::new(InMemoryTaskStore::new());
        let orchestrator = Arc::new(Orchestrator::new(task_store, store.clone(), vault.clone(), EventBus::new()));

        Self {
            config,
            store,
            vault,
            catalog,
            dispatcher,
            agent_loop,
            orchestrator,
            terminal: TerminalSessions::new(),
        }
    }
}

/// Reads an environment secret, or falls back to a fixed, loudly-logged
/// development value (§6: "absence triggers a development fallback with a
/// loud warning").
fn secret_or_dev_fallback(var: &str) -> String {
    match env::var(var) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                variable = var,
                "{var} is not set; using an insecure development fallback. Set {var} before \
                 deploying this service."
            );
            format!("insecure-development-{var}")
        }
    }
}
