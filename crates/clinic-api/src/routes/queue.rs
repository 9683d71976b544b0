//! Visit queue.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use serde::Deserialize;
use serde_json::json;

use clinic_core::queue::{NewQueueEntry, QueueUpdate};
use clinic_core::{AppointmentId, DoctorId, Error, QueueId, QueueStatus, Role};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

const STAFF: &[Role] = &[Role::Doctor, Role::Admin];

/// Queue routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(list_queue).post(enqueue))
        // GET takes an appointment id; PUT and DELETE take a queue id.
        .route(
            "/queue/{id}",
            get(queue_for_appointment)
                .put(update_queue)
                .delete(delete_queue),
        )
        .route("/queue/doctor/{doctor_id}", get(queue_for_doctor))
        .route("/queue/{id}/mark-done", put(mark_done))
}

async fn list_queue(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.list_queue().await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnqueueBody {
    appointment_id: Option<AppointmentId>,
    assigned_to: Option<DoctorId>,
}

async fn enqueue(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<EnqueueBody>,
) -> Result<impl IntoResponse> {
    caller.require(STAFF)?;
    let appointment_id = body
        .appointment_id
        .ok_or_else(|| Error::validation_field("appointment_id", "Appointment ID is required"))?;
    let entry = state
        .store
        .enqueue(NewQueueEntry {
            appointment_id,
            assigned_to: body.assigned_to,
        })
        .await?;
    tracing::info!(queue_id = %entry.id, appointment_id = %appointment_id, "queued appointment");
    Ok((
        StatusCode::CREATED,
        ApiJson(json!({
            "message": "Appointment added to queue and status updated to 'Approved'",
            "id": entry.id,
        })),
    ))
}

async fn queue_for_appointment(
    State(state): State<AppState>,
    ApiPath(appointment): ApiPath<AppointmentId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.queue_for_appointment(appointment).await?))
}

async fn queue_for_doctor(
    State(state): State<AppState>,
    ApiPath(doctor): ApiPath<DoctorId>,
) -> Result<impl IntoResponse> {
    let entries = state.store.queue_for_doctor(doctor).await?;
    if entries.is_empty() {
        return Err(Error::not_found("queue entries for doctor", doctor).into());
    }
    Ok(ApiJson(entries))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateBody {
    status: Option<String>,
    assigned_to: Option<DoctorId>,
}

async fn update_queue(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<QueueId>,
    ApiJson(body): ApiJson<UpdateBody>,
) -> Result<impl IntoResponse> {
    caller.require(STAFF)?;
    let update = QueueUpdate {
        status: body
            .status
            .as_deref()
            .map(str::parse::<QueueStatus>)
            .transpose()?,
        assigned_to: body.assigned_to,
    };
    let entry = state.store.update_queue(id, update).await?;
    Ok(ApiJson(json!({ "message": "Queue status updated", "queue": entry })))
}

async fn mark_done(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<QueueId>,
) -> Result<impl IntoResponse> {
    caller.require(STAFF)?;
    let entry = state.store.mark_queue_done(id).await?;
    tracing::info!(queue_id = %id, appointment_id = %entry.appointment_id, "visit done");
    Ok(ApiJson(json!({
        "message": "Queue entry and appointment marked as done",
        "queue": entry,
    })))
}

async fn delete_queue(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<QueueId>,
) -> Result<impl IntoResponse> {
    caller.require(STAFF)?;
    state.store.delete_queue(id).await?;
    Ok(ApiJson(json!({ "message": "Queue entry deleted" })))
}
