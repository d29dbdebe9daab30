// Bearer-token sources for authenticated backends.

use crate::config::AuthSection;
use crate::error::ApiError;

/// Supplies the session token attached as `Authorization: Bearer <token>`.
///
/// The identity provider itself lives outside this crate; implementations
/// only hand over whatever token the surrounding session holds.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    /// Current token, or an error when no session is available.
    async fn token(&self) -> Result<String, ApiError>;
}

/// Reads the token from an environment variable on every request.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn token(&self) -> Result<String, ApiError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ApiError::Auth(format!(
                "user management is enabled but ${} is not set",
                self.var
            ))),
        }
    }
}

/// A fixed token, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

/// Build the token provider for a config: `None` when auth is disabled.
pub fn provider_for(auth: &AuthSection) -> Option<Box<dyn TokenProvider>> {
    if auth.enabled {
        Some(Box::new(EnvTokenProvider::new(&auth.token_env)))
    } else {
        None
    }
}
