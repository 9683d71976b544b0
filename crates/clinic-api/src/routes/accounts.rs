//! Patient, doctor and admin accounts.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;

use clinic_auth::{AuthError, Principal};
use clinic_core::accounts::{AdminUpdate, DoctorUpdate, NewAdmin, NewDoctor, NewUser, UserUpdate};
use clinic_core::config::BootstrapConfig;
use clinic_core::validate::{self, DOCTOR_PASSWORD_MIN, USER_PASSWORD_MIN};
use clinic_core::{AdminId, DoctorId, PurposeId, Role, SpecialtyId, UserId};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

/// Registration and login.
pub fn public() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/doctor/register", post(register_doctor))
        .route("/doctor/login", post(login_doctor))
        .route("/admin/login", post(login_admin))
}

/// Profiles and directories.
pub fn protected() -> Router<AppState> {
    Router::new()
        .route("/user/{id}", get(get_user).put(update_user))
        .route("/users", get(list_users))
        .route("/doctor/profile/{id}", get(doctor_profile).put(update_doctor))
        .route("/doctors", get(list_doctors))
        .route("/doctors/purpose/{purpose_id}", get(doctors_for_purpose))
        .route("/admin/profile/{id}", get(admin_profile).put(update_admin))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterUser {
    #[serde(rename = "fullName", alias = "name")]
    full_name: String,
    email: String,
    password: String,
    phone: String,
    address: String,
    birthday: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Login {
    email: String,
    password: String,
}

impl Login {
    fn validate(&self) -> Result<String> {
        let email = validate::email(&self.email)?;
        validate::required("password", &self.password, "Password is required")?;
        Ok(email)
    }
}

async fn register_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterUser>,
) -> Result<impl IntoResponse> {
    let email = validate::email(&body.email)?;
    validate::password(&body.password, USER_PASSWORD_MIN)?;
    let name = validate::required("fullName", &body.full_name, "Full Name is required")?;
    let phone = validate::required("phone", &body.phone, "Phone number is required")?;
    let address = validate::required("address", &body.address, "Address is required")?;
    validate::required("birthday", &body.birthday, "Birthday is required")?;
    let birthdate = validate::date("birthday", &body.birthday)?;

    let user = state
        .store
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash: state.passwords.hash(&body.password)?,
            avatar: None,
            birthdate: Some(birthdate),
            address: Some(address.to_string()),
            phone_number: Some(phone.to_string()),
        })
        .await?;
    tracing::info!(user_id = %user.id, "registered user");

    let token = state.issue_token(&Principal::user(user.id, &user.email, &user.name))?;
    Ok(ApiJson(json!({ "token": token, "user": user })))
}

async fn login_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Login>,
) -> Result<impl IntoResponse> {
    let email = body.validate()?;
    let found = state.store.find_user_by_email(&email).await?;
    let Some(found) = found.filter(|f| state.passwords.verify(&body.password, &f.password_hash))
    else {
        return Err(AuthError::InvalidCredentials.into());
    };
    let user = found.account;
    let token = state.issue_token(&Principal::user(user.id, &user.email, &user.name))?;
    Ok(ApiJson(json!({ "token": token, "user": user })))
}

async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<UserId>,
) -> Result<impl IntoResponse> {
    caller.require_self(Role::User, id.get())?;
    Ok(ApiJson(state.store.get_user(id).await?))
}

async fn list_users(State(state): State<AppState>, caller: Caller) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin, Role::Doctor])?;
    Ok(ApiJson(state.store.list_users().await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserProfileBody {
    name: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    birthday: Option<String>,
}

async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<UserProfileBody>,
) -> Result<impl IntoResponse> {
    caller.require_self(Role::User, id.get())?;
    let update = UserUpdate {
        name: non_empty("name", body.name.as_deref(), "Name is required")?,
        email: body.email.as_deref().map(validate::email).transpose()?,
        avatar: body.avatar,
        birthdate: body
            .birthday
            .as_deref()
            .map(|b| validate::date("birthday", b))
            .transpose()?,
        address: non_empty("address", body.address.as_deref(), "Address is required")?,
        phone_number: non_empty("phone", body.phone.as_deref(), "Phone number is required")?,
    };
    Ok(ApiJson(state.store.update_user(id, update).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterDoctor {
    name: String,
    email: String,
    password: String,
    birthdate: String,
    address: String,
    specialization_id: Option<SpecialtyId>,
    phone_number: String,
}

async fn register_doctor(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterDoctor>,
) -> Result<impl IntoResponse> {
    let name = validate::required("name", &body.name, "Name is required")?;
    let email = validate::email(&body.email)?;
    validate::password(&body.password, DOCTOR_PASSWORD_MIN)?;
    validate::required("birthdate", &body.birthdate, "Birthdate is required")?;
    let birthdate = validate::date("birthdate", &body.birthdate)?;
    let address = validate::required("address", &body.address, "Address is required")?;
    let specialization_id = body.specialization_id.ok_or_else(|| {
        clinic_core::Error::validation_field("specialization_id", "Specialization ID is required")
    })?;
    let phone = validate::required("phone_number", &body.phone_number, "Phone number is required")?;

    let doctor = state
        .store
        .create_doctor(NewDoctor {
            name: name.to_string(),
            email,
            password_hash: state.passwords.hash(&body.password)?,
            birthdate: Some(birthdate),
            address: Some(address.to_string()),
            specialization_id,
            phone_number: Some(phone.to_string()),
        })
        .await?;
    tracing::info!(doctor_id = %doctor.id, "registered doctor");

    Ok((
        StatusCode::CREATED,
        ApiJson(json!({ "msg": "Doctor registered successfully", "doctorId": doctor.id })),
    ))
}

async fn login_doctor(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Login>,
) -> Result<impl IntoResponse> {
    let email = body.validate()?;
    let found = state.store.find_doctor_by_email(&email).await?;
    let Some(found) = found.filter(|f| state.passwords.verify(&body.password, &f.password_hash))
    else {
        return Err(AuthError::InvalidCredentials.into());
    };
    let doctor = found.account;
    let token = state.issue_token(&Principal::doctor(doctor.id, &doctor.email, &doctor.name))?;
    Ok(ApiJson(json!({ "token": token, "doctor": doctor })))
}

async fn doctor_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DoctorId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.doctor_profile(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DoctorProfileBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    avatar: Option<String>,
    birthdate: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
    specialization_id: Option<SpecialtyId>,
}

async fn update_doctor(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<DoctorId>,
    ApiJson(body): ApiJson<DoctorProfileBody>,
) -> Result<impl IntoResponse> {
    caller.require_self(Role::Doctor, id.get())?;
    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            validate::password(password, DOCTOR_PASSWORD_MIN)?;
            Some(state.passwords.hash(password)?)
        }
        None => None,
    };
    let update = DoctorUpdate {
        name: non_empty("name", body.name.as_deref(), "Name is required")?,
        email: body.email.as_deref().map(validate::email).transpose()?,
        password_hash,
        avatar: body.avatar,
        birthdate: body
            .birthdate
            .as_deref()
            .map(|b| validate::date("birthdate", b))
            .transpose()?,
        address: body.address,
        phone_number: body.phone_number,
        status: None,
        specialization_id: body.specialization_id,
    };
    Ok(ApiJson(state.store.update_doctor(id, update).await?))
}

async fn list_doctors(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.list_doctors().await?))
}

async fn doctors_for_purpose(
    State(state): State<AppState>,
    ApiPath(purpose): ApiPath<PurposeId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.doctors_for_purpose(purpose).await?))
}

async fn login_admin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Login>,
) -> Result<impl IntoResponse> {
    let email = body.validate()?;
    let found = state.store.find_admin_by_email(&email).await?;
    let Some(found) = found.filter(|f| state.passwords.verify(&body.password, &f.password_hash))
    else {
        return Err(AuthError::InvalidCredentials.into());
    };
    let admin = found.account;
    let token = state.issue_token(&Principal::admin(admin.id, &admin.email, &admin.name))?;
    Ok(ApiJson(json!({ "token": token, "admin": admin })))
}

async fn admin_profile(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AdminId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    Ok(ApiJson(state.store.get_admin(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdminProfileBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    avatar: Option<String>,
}

async fn update_admin(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AdminId>,
    ApiJson(body): ApiJson<AdminProfileBody>,
) -> Result<impl IntoResponse> {
    caller.require_self(Role::Admin, id.get())?;
    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(state.passwords.hash(password)?),
        None => None,
    };
    let update = AdminUpdate {
        name: body.name.filter(|n| !n.trim().is_empty()),
        email: body
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(validate::email)
            .transpose()?,
        password_hash,
        avatar: body.avatar,
    };
    let admin = state.store.update_admin(id, update).await?;
    Ok(ApiJson(json!({ "msg": "Profile updated successfully", "admin": admin })))
}

/// Creates the configured admin when the `admins` table is empty.
pub async fn bootstrap_admin(state: &AppState, bootstrap: &BootstrapConfig) -> Result<()> {
    let admin = NewAdmin {
        name: bootstrap.admin_name.clone(),
        email: validate::email(&bootstrap.admin_email)?,
        password_hash: state.passwords.hash(&bootstrap.admin_password)?,
    };
    match state.store.ensure_admin(admin).await? {
        Some(created) => tracing::info!(admin_id = %created.id, email = %created.email, "created default admin"),
        None => tracing::debug!("admin account already present"),
    }
    Ok(())
}

// Present but blank is a validation error; absent keeps the stored value.
fn non_empty(field: &str, value: Option<&str>, message: &str) -> Result<Option<String>> {
    value
        .map(|v| validate::required(field, v, message).map(str::to_string))
        .transpose()
        .map_err(Into::into)
}
