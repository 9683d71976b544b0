//! Shared handler state.

use std::sync::Arc;

use clinic_auth::{AuthConfig, JwtKeys, PasswordHasher, Principal};
use clinic_core::ClinicConfig;
use clinic_storage::ClinicStore;

use crate::error::Result;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Repository for every resource.
    pub store: Arc<dyn ClinicStore>,
    /// Token signing and validation.
    pub tokens: Arc<JwtKeys>,
    /// Password hashing.
    pub passwords: PasswordHasher,
    /// Whether protected routes require a token.
    pub auth: AuthConfig,
}

impl AppState {
    /// Builds state from a loaded configuration.
    pub fn new(store: Arc<dyn ClinicStore>, config: &ClinicConfig) -> Self {
        Self {
            store,
            tokens: Arc::new(JwtKeys::new(
                &config.auth.jwt_secret,
                config.auth.token_ttl_hours,
            )),
            passwords: PasswordHasher::default(),
            auth: AuthConfig::from(&config.auth),
        }
    }

    /// Replaces the password hasher (tests use a low bcrypt cost).
    pub fn with_passwords(mut self, passwords: PasswordHasher) -> Self {
        self.passwords = passwords;
        self
    }

    /// Signs a session token for `principal`.
    pub fn issue_token(&self, principal: &Principal) -> Result<String> {
        Ok(self.tokens.issue(principal)?)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
