//! Dashboard counters.

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use clinic_core::DoctorId;
use clinic_core::stats::{WeeklySeries, week_start, weekly_histogram};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Statistics routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/allstats", get(clinic_stats))
        .route("/stats/doctor", get(doctor_stats))
        .route("/weekly", get(weekly))
}

async fn clinic_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.clinic_stats(None).await?))
}

#[derive(Debug, Deserialize)]
struct DoctorQuery {
    #[serde(rename = "doctorId")]
    doctor_id: Option<DoctorId>,
}

async fn doctor_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DoctorQuery>,
) -> Result<impl IntoResponse> {
    let doctor = query
        .doctor_id
        .ok_or_else(|| ApiError::bad_request("Doctor ID is required"))?;
    Ok(ApiJson(state.store.clinic_stats(Some(doctor)).await?))
}

async fn weekly(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let series = weekly_series(&state, Local::now().date_naive()).await?;
    Ok(ApiJson(json!({ "success": true, "data": series })))
}

/// Pending appointments per weekday of the week containing `today`.
async fn weekly_series(state: &AppState, today: NaiveDate) -> Result<WeeklySeries> {
    let start = week_start(today);
    let dates = state
        .store
        .pending_dates(start, start + Duration::days(6))
        .await?;
    Ok(WeeklySeries::appointments(weekly_histogram(dates, today)))
}
