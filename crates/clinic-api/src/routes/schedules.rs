//! Doctor schedules and slot availability.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use serde::Deserialize;
use serde_json::json;

use clinic_core::schedule::NewSchedule;
use clinic_core::{DoctorId, Error, Role, ScheduleId, validate};

use crate::error::{ApiError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery, Caller};
use crate::state::AppState;

/// Schedule routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route("/schedules/{id}", delete(delete_schedule))
        .route("/schedules/doctor/{doctor_id}", get(schedules_for_doctor))
        .route("/available-slots", get(available_slots))
        .route("/appointments/remaining/{schedule_id}", get(remaining_slots))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScheduleBody {
    doctor_id: Option<DoctorId>,
    schedule_date: String,
    am_max_patients: Option<i64>,
    pm_max_patients: Option<i64>,
}

fn capacity(field: &str, label: &str, value: Option<i64>) -> Result<u32> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::validation_field(field, format!("{label} max patients must be a non-negative integer."))
                .into()
        })
}

async fn create_schedule(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<ScheduleBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    let doctor_id = body
        .doctor_id
        .ok_or_else(|| Error::validation_field("doctor_id", "Doctor ID is required."))?;
    if let Some(own) = caller.0.as_ref().filter(|p| p.role == Role::Doctor)
        && own.id != doctor_id.get()
    {
        return Err(clinic_auth::AuthError::Forbidden { role: own.role }.into());
    }
    validate::required("schedule_date", &body.schedule_date, "Schedule date is required.")?;
    let schedule_date = validate::date("schedule date", &body.schedule_date)?;

    let schedule = state
        .store
        .create_schedule(NewSchedule {
            doctor_id,
            schedule_date,
            am_max_patients: capacity("am_max_patients", "AM", body.am_max_patients)?,
            pm_max_patients: capacity("pm_max_patients", "PM", body.pm_max_patients)?,
        })
        .await?;
    tracing::info!(schedule_id = %schedule.id, doctor_id = %doctor_id, date = %schedule_date, "created schedule");
    Ok((StatusCode::CREATED, ApiJson(schedule)))
}

async fn list_schedules(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.list_schedules().await?))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<String>,
}

async fn schedules_for_doctor(
    State(state): State<AppState>,
    ApiPath(doctor): ApiPath<DoctorId>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> Result<impl IntoResponse> {
    let schedules = state.store.schedules_for_doctor(doctor).await?;
    if schedules.is_empty() {
        return Err(Error::not_found("schedules for doctor", doctor).into());
    }
    match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(date) => {
            let date = validate::date("date", date)?;
            let exists = schedules.iter().any(|s| s.schedule_date == date);
            Ok(ApiJson(json!({ "exists": exists, "schedules": schedules })))
        }
        None => Ok(ApiJson(json!(schedules))),
    }
}

#[derive(Debug, Deserialize)]
struct DoctorQuery {
    #[serde(rename = "doctorId")]
    doctor_id: Option<DoctorId>,
}

async fn available_slots(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DoctorQuery>,
) -> Result<impl IntoResponse> {
    let doctor = query
        .doctor_id
        .ok_or_else(|| ApiError::bad_request("Doctor ID is required."))?;
    Ok(ApiJson(state.store.available_slots(doctor).await?))
}

async fn remaining_slots(
    State(state): State<AppState>,
    ApiPath(schedule): ApiPath<ScheduleId>,
) -> Result<impl IntoResponse> {
    let day = state.store.remaining_slots(schedule).await?;
    Ok(ApiJson(json!({
        "schedule_id": day.schedule_id,
        "am": day.am.remaining_slots,
        "pm": day.pm.remaining_slots,
        "remaining_slots": day.total_remaining(),
    })))
}

async fn delete_schedule(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    state.store.delete_schedule(id).await?;
    Ok(ApiJson(json!({ "message": "Schedule deleted" })))
}
