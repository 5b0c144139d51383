//! Token Service Module
//!
//! Issues and verifies signed, time-limited session tokens (JWT, HMAC family).

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

// == Claims ==
/// Claim set carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the token was issued to
    pub sub: String,
    /// Absolute expiry as a Unix timestamp in seconds
    pub exp: i64,
}

// == Errors ==
/// Verification outcome for any token that is not currently valid.
///
/// Carries no reason: malformed, tampered and expired tokens are reported identically.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

/// Failure to produce a token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// `now + ttl` does not fit in a timestamp
    #[error("token lifetime of {0} minutes is out of range")]
    TtlOutOfRange(i64),
}

// == Token Service ==
/// Signs and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    default_ttl_minutes: i64,
}

impl TokenService {
    // == Constructor ==
    /// Creates a TokenService for the given secret and algorithm.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret
    /// * `algorithm` - Signing algorithm, expected to be one of HS256/HS384/HS512
    /// * `default_ttl_minutes` - Lifetime used by [`TokenService::issue_default`]
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            default_ttl_minutes,
        }
    }

    /// Creates a TokenService from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.jwt_secret_key.as_bytes(),
            config.jwt_algorithm,
            config.access_token_ttl_minutes,
        )
    }

    // == Issue ==
    /// Issues a token for `subject` expiring `ttl_minutes` from now.
    pub fn issue(&self, subject: &str, ttl_minutes: i64) -> Result<String, TokenError> {
        let expiry = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(TokenError::TtlOutOfRange(ttl_minutes))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expiry.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Issues a token with the configured default lifetime.
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl_minutes)
    }

    // == Verify ==
    /// Verifies signature and expiry, returning the decoded claims.
    ///
    /// A token is valid only while `now < exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            debug!(error = %err, "token rejected");
            InvalidToken
        })?;

        // The library accepts exp == now; tokens are already dead at their expiry instant.
        if data.claims.exp <= Utc::now().timestamp() {
            debug!("token rejected: expired");
            return Err(InvalidToken);
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("default_ttl_minutes", &self.default_ttl_minutes)
            .finish_non_exhaustive()
    }
}
