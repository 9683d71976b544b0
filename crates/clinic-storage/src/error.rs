//! Error types for clinic-storage

use thiserror::Error;

/// Result type alias for clinic-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in clinic-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Domain rule violation (not found, conflict, full slot, bad transition)
    #[error(transparent)]
    Core(#[from] clinic_core::Error),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into a domain type
    #[error("Corrupt {column} value: {value}")]
    Corrupt {
        /// Column holding the value
        column: &'static str,
        /// Offending value
        value: String,
    },

    /// The in-memory store lock was poisoned by a panicking writer
    #[error("In-memory store lock poisoned")]
    Poisoned,
}

impl Error {
    /// Shorthand for a not-found domain error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::Core(clinic_core::Error::not_found(entity, id))
    }

    /// Shorthand for a conflict domain error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Core(clinic_core::Error::conflict(message))
    }

    /// Converts a unique-key violation into a conflict with `message`.
    pub fn on_duplicate<S: Into<String>>(err: sqlx::Error, message: S) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::conflict(message),
            _ => Error::Database(err),
        }
    }

    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&clinic_core::Error> {
        match self {
            Error::Core(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this wraps a not-found domain error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Core(clinic_core::Error::NotFound { .. }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_core() {
        let err = Error::not_found("schedule", 9);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "schedule not found: 9");
    }

    #[test]
    fn test_non_unique_database_error_passes_through() {
        let err = Error::on_duplicate(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, Error::Database(_)));
        assert!(err.as_core().is_none());
    }
}
