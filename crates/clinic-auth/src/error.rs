//! Auth-specific error types.

/// Errors that can occur while issuing or checking credentials.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Email or password did not match an account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the account's role may not perform the action.
    #[error("{role} accounts may not perform this action")]
    Forbidden {
        /// Role of the caller
        role: clinic_core::Role,
    },

    /// Signing a token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// bcrypt failed to hash a password.
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Whether this error should result in a 4xx (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature(_)
                | AuthError::Expired
                | AuthError::InvalidCredentials
                | AuthError::Forbidden { .. }
        )
    }
}
