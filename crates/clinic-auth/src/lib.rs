//! Authentication primitives for the clinic service.
//!
//! Provides:
//! - [`Principal`]: identity extracted from a validated token
//! - [`TokenValidator`]: async token validation seam
//! - [`JwtKeys`]: HS256 issuing and validation
//! - [`PasswordHasher`]: bcrypt hashing
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthError`]: auth-specific error types

mod error;
mod middleware;
mod password;
mod principal;
mod token;

pub use error::AuthError;
pub use middleware::{AuthLayer, AuthService};
pub use password::PasswordHasher;
pub use principal::{Principal, principal_from_parts};
pub use token::{Claims, JwtKeys};

/// Configuration for the auth middleware.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, all requests pass through.
    pub enabled: bool,
}

impl From<&clinic_core::config::AuthSettings> for AuthConfig {
    fn from(settings: &clinic_core::config::AuthSettings) -> Self {
        Self {
            enabled: settings.enabled,
        }
    }
}

/// Validates a bearer token and returns the caller's identity.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated principal.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Principal, AuthError>> + Send + '_>,
    >;
}
