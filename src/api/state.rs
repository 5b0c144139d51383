//! Application State
//!
//! Constructor-injected handles shared by every handler.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AccessGuard, CredentialVerifier, FixedIdentity, TokenService};
use crate::cache::PredictionCache;
use crate::config::Config;
use crate::engine::PredictionEngine;
use crate::ml::PriceModel;

/// Application state shared across all handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub guard: Arc<AccessGuard>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub engine: Arc<PredictionEngine>,
    pub cache: Arc<dyn PredictionCache>,
}

impl AppState {
    /// Wires every component from configuration around the loaded model and cache backend.
    pub fn new(
        config: &Config,
        model: Arc<dyn PriceModel>,
        cache: Arc<dyn PredictionCache>,
    ) -> Self {
        let tokens = Arc::new(TokenService::from_config(config));
        let guard = Arc::new(AccessGuard::new(config.api_key.clone(), tokens.clone()));
        let engine = Arc::new(PredictionEngine::from_config(config, model, cache.clone()));

        Self {
            tokens,
            guard,
            credentials: Arc::new(FixedIdentity::from_config(config)),
            engine,
            cache,
        }
    }

    /// Replaces the login credential check.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = credentials;
        self
    }
}

impl FromRef<AppState> for Arc<AccessGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}
