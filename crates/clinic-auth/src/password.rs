//! bcrypt password hashing.

use crate::AuthError;

/// Hashes and checks account passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Hasher with an explicit bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Salts and hashes `plain`.
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        bcrypt::hash(plain, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Checks `plain` against a stored hash. A malformed hash never matches.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        match bcrypt::verify(plain, hash) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Stored password hash could not be parsed: {e}");
                false
            }
        }
    }
}
