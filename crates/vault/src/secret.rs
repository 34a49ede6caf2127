//! The three named secrets (§6, §9 open question: "expose all three as named
//! secrets rather than folding them"). Each backs a distinct encryption
//! scheme for historical reasons that must be preserved.

use std::env;

use zeroize::Zeroizing;

const DEV_FALLBACK_SESSION_SECRET: &str = "dev-insecure-session-secret-do-not-use-in-production";

/// `SESSION_SECRET` — derives the GCM key used for `Server.encryptedCredential`.
#[derive(Clone)]
pub struct SessionSecret(pub(crate) Zeroizing<String>);

/// `API_KEY_ENCRYPTION_SECRET` — derives the CBC key used for user-provided
/// LLM/search API keys.
#[derive(Clone)]
pub struct ApiKeySecret(pub(crate) Zeroizing<String>);

/// `ENCRYPTION_KEY` — derives the GCM key used by monitoring/backup modules
/// (a historical split from `SESSION_SECRET`; must stay distinct).
#[derive(Clone)]
pub struct EncryptionKeySecret(pub(crate) Zeroizing<String>);

impl SessionSecret {
    /// Reads `SESSION_SECRET` from the environment. Absence triggers a loud
    /// warning and a fixed development fallback, per §6.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var("SESSION_SECRET") {
            Ok(v) => Self(Zeroizing::new(v)),
            Err(_) => {
                tracing::warn!(
                    "SESSION_SECRET is not set; falling back to an insecure development \
                     secret. Do not run this configuration in production."
                );
                Self(Zeroizing::new(DEV_FALLBACK_SESSION_SECRET.to_string()))
            }
        }
    }

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }
}

impl ApiKeySecret {
    pub fn from_env() -> crate::error::Result<Self> {
        env::var("API_KEY_ENCRYPTION_SECRET")
            .map(|v| Self(Zeroizing::new(v)))
            .map_err(|_| crate::error::VaultError::MissingSecret("API_KEY_ENCRYPTION_SECRET".into()))
    }

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }
}

impl EncryptionKeySecret {
    pub fn from_env() -> crate::error::Result<Self> {
        env::var("ENCRYPTION_KEY")
            .map(|v| Self(Zeroizing::new(v)))
            .map_err(|_| crate::error::VaultError::MissingSecret("ENCRYPTION_KEY".into()))
    }

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }
}
