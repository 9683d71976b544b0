//! Error types for clinic-core.

use crate::slot::Slot;

/// Errors raised by domain rules and configuration loading.
///
/// Storage and HTTP layers wrap this type; they never need to inspect the
/// message text, only the variant.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if known
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A referenced record does not exist (or was soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. "appointment"
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The request collides with existing state (duplicate email, duplicate schedule).
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable explanation
        message: String,
    },

    /// No capacity left in the requested slot.
    #[error("{slot} slot is full ({max_patients} patients max)")]
    SlotFull {
        /// Slot that was requested
        slot: Slot,
        /// Capacity of that slot
        max_patients: u32,
    },

    /// A status change that the workflow does not allow.
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Configuration is missing or malformed.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error while reading or writing configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for clinic-core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a validation error without a field name.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a validation error for a named field.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Conflict {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::NotFound { .. }
                | Error::Conflict { .. }
                | Error::SlotFull { .. }
                | Error::InvalidTransition { .. }
        )
    }
}
