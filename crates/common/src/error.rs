//! Shared error taxonomy (§7).
//!
//! Crate-local error enums (`VaultError`, `SshError`, ...) model the failure
//! modes specific to their layer. This one models the kinds that cross layer
//! boundaries and need a uniform HTTP/LLM-visibility story.

use thiserror::Error;

/// Error kinds shared across the core. Mirrors §7's taxonomy: tool-layer
/// failures are data returned to the LLM, infrastructure failures surface to
/// the HTTP caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication required")]
    AuthMissing,

    #[error("session expired")]
    AuthExpired,

    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("budget exceeded")]
    BudgetExceeded,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("upstream LLM error: {0}")]
    LlmUpstream(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal error")]
    Other {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn other(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other {
            source: Box::new(source),
        }
    }

    /// HTTP status code this error should surface as, per §7.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Error::AuthMissing | Error::AuthExpired => 401,
            Error::InputInvalid(_) => 400,
            Error::NotFound(_) => 404,
            Error::RateLimited | Error::BudgetExceeded => 429,
            Error::StoreUnavailable(_) => 503,
            Error::LlmUpstream(_) => 502,
            Error::Message(_) | Error::Io(_) | Error::Other { .. } => 500,
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type VpsError = Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for error types constructible from a plain message string, enabling
/// the `impl_context!` macro below in downstream crates.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Generates a crate-local `Context` trait with `.context()`/`.with_context()`
/// on `Result`/`Option`, the way `moltis-common` does it. Invoke from a module
/// that defines a local `Error: FromMessage` and `Result<T>` alias.
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                let ctx = context.into();
                self.map_err(|source| {
                    <Error as $crate::error::FromMessage>::from_message(format!(
                        "{ctx}: {source}"
                    ))
                })
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|source| {
                    let ctx = f().into();
                    <Error as $crate::error::FromMessage>::from_message(format!(
                        "{ctx}: {source}"
                    ))
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.ok_or_else(|| {
                    <Error as $crate::error::FromMessage>::from_message(context.into())
                })
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| {
                    <Error as $crate::error::FromMessage>::from_message(f().into())
                })
            }
        }
    };
}

impl_context!();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(Error::AuthMissing.status_code(), 401);
        assert_eq!(Error::InputInvalid("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("server".into()).status_code(), 404);
        assert_eq!(Error::RateLimited.status_code(), 429);
        assert_eq!(Error::StoreUnavailable("db".into()).status_code(), 503);
        assert_eq!(Error::LlmUpstream("timeout".into()).status_code(), 502);
    }
}
