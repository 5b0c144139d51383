//! Request Extractors
//!
//! Axum extractors that apply the access gates before a handler body runs.
//! Handlers list them ahead of the body extractor so a rejected request never reaches inference.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::{AccessGuard, Claims};
use crate::error::ApiError;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Header carrying the raw bearer token.
pub const TOKEN_HEADER: &str = "token";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Reads the token from the `token` header, falling back to `Authorization: Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, TOKEN_HEADER).or_else(|| {
        header_str(headers, AUTHORIZATION.as_str())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
    })
}

// == API Key Extractor ==
/// Proof that the request carried the configured API key.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

#[async_trait]
impl<S> FromRequestParts<S> for RequireApiKey
where
    Arc<AccessGuard>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        guard.authorize(header_str(&parts.headers, API_KEY_HEADER))?;
        Ok(RequireApiKey)
    }
}

// == Bearer Extractor ==
/// Claims of a verified bearer token.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for BearerClaims
where
    Arc<AccessGuard>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        let claims = guard.authenticate(bearer_token(&parts.headers))?;
        Ok(BearerClaims(claims))
    }
}
