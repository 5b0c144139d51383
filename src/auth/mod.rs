//! Auth Module
//!
//! Session token issuance/verification, login credential checks and the access gates.

mod credentials;
mod extract;
mod guard;
mod token;


// Re-export public types
pub use credentials::{CredentialVerifier, FixedIdentity};
pub use extract::{bearer_token, BearerClaims, RequireApiKey, API_KEY_HEADER, TOKEN_HEADER};
pub use guard::AccessGuard;
pub use token::{Claims, InvalidToken, TokenError, TokenService, DEFAULT_TOKEN_TTL_MINUTES};
