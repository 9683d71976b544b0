//! Route tables, one module per resource.
//!
//! Paths match the ones the patient, doctor and admin portals already call.

pub mod accounts;
pub mod announcements;
pub mod appointments;
pub mod catalog;
pub mod queue;
pub mod records;
pub mod schedules;
pub mod stats;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;

use clinic_auth::AuthLayer;

use crate::extract::ApiJson;
use crate::state::AppState;

/// Full application router. Everything except health, registration and
/// login sits behind the auth layer.
pub fn router(state: AppState) -> Router {
    let auth = AuthLayer::new(state.tokens.clone(), state.auth.clone());

    let protected = Router::new()
        .merge(accounts::protected())
        .merge(catalog::router())
        .merge(schedules::router())
        .merge(appointments::router())
        .merge(queue::router())
        .merge(announcements::router())
        .merge(records::router())
        .merge(stats::router())
        .route_layer(auth);

    Router::new()
        .route("/health", get(health))
        .merge(accounts::public())
        .merge(protected)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    ApiJson(json!({ "status": "ok", "backend": state.store.backend() }))
}
