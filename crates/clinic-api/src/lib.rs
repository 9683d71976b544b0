//! # clinic-api
//!
//! HTTP API for the clinic appointment service.
//!
//! This crate provides:
//! - one axum router per resource, mounted under the paths the portals call
//! - bearer token authentication and role guards
//! - a uniform JSON error envelope
//! - server bootstrap with CORS, request tracing and graceful shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use routes::accounts::bootstrap_admin;
pub use server::{app, serve};
pub use state::AppState;
