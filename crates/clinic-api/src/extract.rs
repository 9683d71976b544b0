//! Request extractors.
//!
//! `ApiJson`, `ApiPath` and `ApiQuery` wrap axum's extractors so that decode
//! failures use the [`ApiError`] envelope instead of axum's plain text.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use clinic_auth::{AuthError, Principal, principal_from_parts};
use clinic_core::Role;

use crate::error::{ApiError, Result};

/// JSON body extractor and responder.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: serde::Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameter extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The authenticated caller, or `None` when auth is disabled.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(Caller(principal_from_parts(parts).cloned()))
    }
}

impl Caller {
    /// Passes when the caller's role is in `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<()> {
        match &self.0 {
            Some(principal) => Ok(principal.require(roles)?),
            None => Ok(()),
        }
    }

    /// Passes for admins and for the account `(role, id)` itself.
    pub fn require_self(&self, role: Role, id: i64) -> Result<()> {
        match &self.0 {
            Some(p) if p.role == Role::Admin => Ok(()),
            Some(p) if p.role == role && p.id == id => Ok(()),
            Some(p) => Err(AuthError::Forbidden { role: p.role }.into()),
            None => Ok(()),
        }
    }
}
