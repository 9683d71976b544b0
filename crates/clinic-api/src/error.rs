//! HTTP error mapping.
//!
//! Every failure leaves the service as
//! `{ "error": { "category": ..., "message": ... } }`, the same envelope the
//! auth middleware uses for 401s.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use clinic_auth::AuthError;

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Anything a handler can fail with.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Domain rule violation or missing record.
    #[error(transparent)]
    Core(#[from] clinic_core::Error),

    /// Database or store failure that is not a domain error.
    #[error(transparent)]
    Storage(clinic_storage::Error),

    /// Credential or permission failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl From<clinic_storage::Error> for ApiError {
    fn from(err: clinic_storage::Error) -> Self {
        match err {
            clinic_storage::Error::Core(core) => ApiError::Core(core),
            other => ApiError::Storage(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Shorthand for a 400 with a fixed message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// HTTP status and the `category` reported in the body.
    pub fn status_and_category(&self) -> (StatusCode, &'static str) {
        use clinic_core::Error as Core;
        match self {
            ApiError::Core(err) => match err {
                Core::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
                Core::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                Core::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
                Core::SlotFull { .. } => (StatusCode::CONFLICT, "slot_full"),
                Core::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
            ApiError::Auth(AuthError::Forbidden { .. }) => (StatusCode::FORBIDDEN, "authorization"),
            ApiError::Auth(err) if err.is_client_error() => {
                (StatusCode::UNAUTHORIZED, "authentication")
            }
            ApiError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category) = self.status_and_category();

        let message = if status.is_server_error() {
            tracing::error!(category, error = %self, "request failed");
            "Server error".to_string()
        } else {
            tracing::debug!(category, error = %self, "request rejected");
            self.to_string()
        };

        let mut error = json!({
            "category": category,
            "message": message,
        });
        if let ApiError::Core(clinic_core::Error::Validation {
            field: Some(field), ..
        }) = &self
        {
            error["field"] = json!(field);
        }

        (status, axum::Json(json!({ "error": error }))).into_response()
    }
}
