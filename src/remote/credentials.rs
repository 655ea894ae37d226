//! Opaque credential provider
//!
//! Token acquisition is out of scope for the engine: callers hand it
//! something that can produce a bearer token and the engine never looks
//! inside. The static implementation below covers configuration-supplied
//! tokens; hosts with real token refresh implement the trait themselves.

use crate::{Result, TideError};

/// Environment variable that overrides the configured bearer token.
pub const TOKEN_ENV_VAR: &str = "TIDEWALK_TOKEN";

/// Source of bearer tokens for remote API calls.
pub trait CredentialProvider: Send + Sync {
    /// Returns a bearer token valid for the next request.
    fn bearer_token(&self) -> Result<String>;
}

/// A fixed bearer token, taken from configuration or the environment.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Creates a provider around a literal token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Builds a provider from the configured token, letting the
    /// `TIDEWALK_TOKEN` environment variable take precedence.
    pub fn from_config(configured: Option<&str>) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| configured.map(str::to_string).filter(|t| !t.is_empty()));

        match token {
            Some(token) => Ok(Self { token }),
            None => Err(TideError::Fatal {
                message: format!(
                    "no bearer token configured (set [credentials] bearer-token or {})",
                    TOKEN_ENV_VAR
                ),
            }),
        }
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        let provider = StaticToken::new("abc123");
        assert_eq!(provider.bearer_token().unwrap(), "abc123");
    }

    #[test]
    fn test_from_config_uses_configured_token() {
        let provider = StaticToken::from_config(Some("from-config")).unwrap();
        assert_eq!(provider.bearer_token().unwrap(), "from-config");
    }

    #[test]
    fn test_from_config_missing_token_is_fatal() {
        let result = StaticToken::from_config(None);
        assert!(result.is_err());
    }
}
