//! Access Guard Module
//!
//! Two independent gates for protected operations: the shared API key and the bearer token.

use std::sync::Arc;

use tracing::debug;

use crate::auth::{Claims, TokenService};
use crate::error::{ApiError, Result};

// == Access Guard ==
/// Validates API keys and bearer tokens against injected configuration.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    api_key: String,
    tokens: Arc<TokenService>,
}

impl AccessGuard {
    // == Constructor ==
    pub fn new(api_key: impl Into<String>, tokens: Arc<TokenService>) -> Self {
        Self {
            api_key: api_key.into(),
            tokens,
        }
    }

    // == API Key Gate ==
    /// Exact match against the configured key.
    pub fn check_api_key(&self, provided: &str) -> bool {
        provided == self.api_key
    }

    /// Rejects with an authorization failure when the key is absent or mismatched.
    pub fn authorize(&self, provided: Option<&str>) -> Result<()> {
        match provided {
            Some(key) if self.check_api_key(key) => Ok(()),
            _ => {
                debug!("api key rejected");
                Err(ApiError::Forbidden)
            }
        }
    }

    // == Bearer Gate ==
    /// Verifies a bearer token, yielding its claims.
    pub fn check_bearer(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token).map_err(|_| ApiError::Unauthorized)
    }

    /// Rejects with an authentication failure when the token is absent or invalid.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Claims> {
        match token {
            Some(token) => self.check_bearer(token),
            None => Err(ApiError::Unauthorized),
        }
    }
}
