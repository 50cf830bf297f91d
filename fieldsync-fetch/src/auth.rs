//! Credential providers.
//!
//! The executor treats credentials as opaque: at the start of each
//! authenticated call it asks a [`CredentialProvider`] for a bearer token. How the
//! token was obtained or refreshed is the provider's business.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

/// Environment variable read by [`EnvToken::default`].
pub const TOKEN_ENV_VAR: &str = "FIELDSYNC_TOKEN";

/// Supplies bearer tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the current token, or `None` if there is none.
    async fn bearer_token(&self) -> Option<String>;
}

#[async_trait]
impl<P: CredentialProvider + ?Sized> CredentialProvider for Arc<P> {
    async fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token().await
    }
}

// ============================================================================
// Static Token
// ============================================================================

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        if self.0.trim().is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

// ============================================================================
// Environment Token
// ============================================================================

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Reads from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// The variable name.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

#[async_trait]
impl CredentialProvider for EnvToken {
    async fn bearer_token(&self) -> Option<String> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Some(token),
            _ => {
                debug!(var = %self.var, "No token in environment");
                None
            }
        }
    }
}

// ============================================================================
// No Credentials
// ============================================================================

/// Never yields a token. Authenticated calls fail before dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        assert_eq!(
            StaticToken::new("abc").bearer_token().await.as_deref(),
            Some("abc")
        );
        assert_eq!(StaticToken::new("  ").bearer_token().await, None);
    }

    #[test]
    fn test_static_token_debug_is_redacted() {
        let debug = format!("{:?}", StaticToken::new("super-secret"));
        assert!(!debug.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_env_token_missing_variable() {
        let provider = EnvToken::new("FIELDSYNC_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert_eq!(provider.bearer_token().await, None);
    }

    #[tokio::test]
    async fn test_shared_provider() {
        let shared: Arc<dyn CredentialProvider> = Arc::new(StaticToken::new("abc"));
        assert_eq!(shared.bearer_token().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_no_credentials() {
        assert_eq!(NoCredentials.bearer_token().await, None);
    }
}
