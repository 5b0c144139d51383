//! API Handlers
//!
//! HTTP request handlers for each prediction service endpoint.

use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::auth::{BearerClaims, CredentialVerifier, RequireApiKey};
use crate::cache::PredictionCache;
use crate::engine::FeaturePayload;
use crate::error::{ApiError, Result};
use crate::models::{
    HealthResponse, LoginRequest, PredictionResponse, StatsResponse, TokenResponse,
};

/// Handler for POST /login
///
/// Issues a session token when the credentials match the configured identity.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    if !state.credentials.verify(&req.username, &req.password) {
        warn!(username = %req.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue_default(&req.username)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    info!(username = %req.username, "session token issued");
    Ok(Json(TokenResponse::bearer(token)))
}

/// Handler for POST /predict
///
/// The gate extractors run before the body is read, so a rejected request
/// never reaches the engine.
pub async fn predict_handler(
    _api_key: RequireApiKey,
    BearerClaims(claims): BearerClaims,
    State(state): State<AppState>,
    Json(features): Json<FeaturePayload>,
) -> Result<Json<PredictionResponse>> {
    let prediction = state.engine.predict(&features).await?;

    debug!(
        subject = %claims.sub,
        source = ?prediction.source,
        value = prediction.value,
        "prediction served"
    );
    Ok(Json(PredictionResponse::new(prediction.value)))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(
    _api_key: RequireApiKey,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await.ok_or_else(|| {
        ApiError::NotFound("statistics are not tracked by this cache backend".to_string())
    })?;

    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::MemoryCache;
    use crate::config::Config;
    use crate::ml::{FeaturePayload, ModelError, PriceModel};

    struct FlatModel(f64);

    impl PriceModel for FlatModel {
        fn predict(&self, _: &FeaturePayload) -> std::result::Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    fn state() -> (AppState, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new(100));
        let state = AppState::new(&Config::default(), Arc::new(FlatModel(42.0)), cache.clone());
        (state, cache)
    }

    fn login(username: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let (state, _) = state();

        let response = login_handler(State(state.clone()), login("admin", "admin"))
            .await
            .unwrap();

        assert_eq!(response.token_type, "bearer");
        let claims = state.tokens.verify(&response.access_token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let (state, _) = state();

        let result = login_handler(State(state), login("admin", "wrong")).await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_with_unrepresentable_ttl_is_internal_error() {
        let config = Config {
            access_token_ttl_minutes: i64::MAX,
            ..Config::default()
        };
        let state = AppState::new(
            &config,
            Arc::new(FlatModel(42.0)),
            Arc::new(MemoryCache::new(10)),
        );

        let result = login_handler(State(state), login("admin", "admin")).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[tokio::test]
    async fn test_login_uses_injected_verifier() {
        struct Nobody;

        impl CredentialVerifier for Nobody {
            fn verify(&self, _: &str, _: &str) -> bool {
                false
            }
        }

        let (state, _) = state();
        let state = state.with_credentials(Arc::new(Nobody));

        let result = login_handler(State(state), login("admin", "admin")).await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_predict_handler_returns_estimate() {
        let (state, cache) = state();
        let token = state.tokens.issue("admin", 30).unwrap();
        let claims = state.tokens.verify(&token).unwrap();
        let features = json!({"year": 2018}).as_object().cloned().unwrap();

        let response = predict_handler(
            RequireApiKey,
            BearerClaims(claims),
            State(state),
            Json(features),
        )
        .await
        .unwrap();

        assert_eq!(response.prediction, 42.0);
        assert_eq!(cache.get("2018").await.unwrap(), Some(42.0));
    }

    #[tokio::test]
    async fn test_cache_stats_handler() {
        let (state, _) = state();

        let response = cache_stats_handler(RequireApiKey, State(state)).await.unwrap();
        assert_eq!(response.hits, 0);
        assert_eq!(response.writes, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
