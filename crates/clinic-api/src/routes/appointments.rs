//! Booking and the appointment lifecycle.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use serde::Deserialize;
use serde_json::json;

use clinic_core::appointment::{AppointmentUpdate, Booking, IntakeForm, VisitRecord};
use clinic_core::{
    AppointmentId, AppointmentStatus, DoctorId, Error, Purpose, Role, ScheduleId, Slot, UserId,
    validate,
};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

/// Appointment routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(appointment_board).post(book))
        .route("/appointments/details", get(appointment_details))
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/doctor/{doctor_id}", get(doctor_board))
        .route("/appointments/user/{user_id}", get(user_appointments))
        .route("/appointments/{id}/remarks", put(record_visit))
        .route("/appointments/{id}/reject", put(reject))
        .route("/appointments/{id}/patient-details", get(patient_details))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BookingBody {
    user_id: Option<UserId>,
    doctor_id: Option<DoctorId>,
    selected_date: String,
    form_data: serde_json::Value,
    purpose: String,
    slot_period: String,
}

impl BookingBody {
    fn into_booking(self, caller: &Caller) -> Result<Booking> {
        let user_id = match (self.user_id, caller.0.as_ref()) {
            (Some(id), _) => id,
            (None, Some(p)) if p.role == Role::User => UserId::new(p.id),
            (None, _) => return Err(Error::validation_field("userId", "User ID is required").into()),
        };
        caller.require_self(Role::User, user_id.get())?;
        let doctor_id = self
            .doctor_id
            .ok_or_else(|| Error::validation_field("doctorId", "Doctor ID is required"))?;
        let purpose: Purpose = self.purpose.parse()?;
        let slot: Slot = self.slot_period.parse()?;
        Ok(Booking {
            user_id,
            doctor_id,
            selected_date: validate::date("selectedDate", &self.selected_date)?,
            slot,
            intake: IntakeForm::parse(purpose, self.form_data)?,
        })
    }
}

async fn book(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<BookingBody>,
) -> Result<impl IntoResponse> {
    let booking = body.into_booking(&caller)?;
    let receipt = state.store.book(booking).await?;
    tracing::info!(
        appointment_id = %receipt.appointment_id,
        schedule_id = %receipt.schedule_id,
        slot = %receipt.slot,
        remaining = receipt.remaining_slots,
        "booked appointment"
    );
    Ok((StatusCode::CREATED, ApiJson(receipt)))
}

async fn get_appointment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AppointmentId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.get_appointment(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateBody {
    user_id: Option<UserId>,
    doctor_id: Option<DoctorId>,
    schedule_id: Option<ScheduleId>,
    purpose_of_appointment: Option<String>,
    appointment_date: Option<String>,
    status: Option<String>,
}

async fn update_appointment(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AppointmentId>,
    ApiJson(body): ApiJson<UpdateBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    let update = AppointmentUpdate {
        user_id: body.user_id,
        doctor_id: body.doctor_id,
        schedule_id: body.schedule_id,
        purpose_of_appointment: body.purpose_of_appointment,
        appointment_date: body
            .appointment_date
            .as_deref()
            .map(|d| validate::date("appointment_date", d))
            .transpose()?,
        status: body
            .status
            .as_deref()
            .map(str::parse::<AppointmentStatus>)
            .transpose()?,
    };
    Ok(ApiJson(state.store.update_appointment(id, update).await?))
}

async fn delete_appointment(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AppointmentId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    state.store.delete_appointment(id).await?;
    Ok(ApiJson(json!({ "message": "Appointment deleted" })))
}

async fn appointment_board(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let board = state.store.appointment_board(None).await?;
    if board.is_empty() {
        return Err(Error::not_found("appointments", "any").into());
    }
    Ok(ApiJson(board))
}

async fn doctor_board(
    State(state): State<AppState>,
    ApiPath(doctor): ApiPath<DoctorId>,
) -> Result<impl IntoResponse> {
    let board = state.store.appointment_board(Some(doctor)).await?;
    if board.is_empty() {
        return Err(Error::not_found("appointments for doctor", doctor).into());
    }
    Ok(ApiJson(board))
}

async fn appointment_details(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let details = state.store.appointment_details().await?;
    if details.is_empty() {
        return Err(Error::not_found("appointments", "any").into());
    }
    Ok(ApiJson(details))
}

async fn user_appointments(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(user): ApiPath<UserId>,
) -> Result<impl IntoResponse> {
    if caller.0.as_ref().is_some_and(|p| p.role == Role::User) {
        caller.require_self(Role::User, user.get())?;
    }
    let appointments = state.store.user_appointments(user).await?;
    if appointments.is_empty() {
        return Err(Error::not_found("appointments for user", user).into());
    }
    Ok(ApiJson(appointments))
}

async fn record_visit(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AppointmentId>,
    ApiJson(visit): ApiJson<VisitRecord>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    visit.validate()?;
    state.store.record_visit(id, visit).await?;
    Ok(ApiJson(json!({
        "message": "Remarks, vital signs, and diagnosis updated successfully",
    })))
}

async fn reject(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AppointmentId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    let appointment = state.store.reject_appointment(id).await?;
    tracing::info!(appointment_id = %id, "rejected appointment");
    Ok(ApiJson(json!({
        "message": "Appointment rejected and soft deleted successfully",
        "appointment": appointment,
    })))
}

async fn patient_details(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AppointmentId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.patient_details(id).await?))
}
