//! Credential Verification Module
//!
//! Checks login credentials. The only shipped implementation is a single fixed identity.

/// Verifies a username/password pair presented at login.
pub trait CredentialVerifier: Send + Sync {
    /// Returns true when the pair identifies a known principal.
    fn verify(&self, username: &str, password: &str) -> bool;
}

// == Fixed Identity ==
/// Accepts exactly one configured username/password pair.
#[derive(Clone)]
pub struct FixedIdentity {
    username: String,
    password: String,
}

impl FixedIdentity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates the identity from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.auth_username.clone(), config.auth_password.clone())
    }
}

impl CredentialVerifier for FixedIdentity {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

impl std::fmt::Debug for FixedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedIdentity")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
