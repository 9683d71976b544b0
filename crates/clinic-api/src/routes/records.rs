//! Prenatal and immunization intake records.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;

use clinic_core::appointment::PrenatalForm;
use clinic_core::{Error, PrenatalId, Role, UserId, validate};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

/// Intake record routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prenatal-info", post(create_prenatal))
        .route(
            "/prenatal-info/{id}",
            get(get_prenatal)
                .put(update_prenatal)
                .delete(delete_prenatal),
        )
        .route("/immunization-info/{user_id}", get(immunization_for_user))
        .route("/immunizations", get(list_immunizations))
}

#[derive(Debug, Deserialize)]
struct PrenatalBody {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(flatten)]
    form: PrenatalForm,
}

fn checked(form: PrenatalForm) -> Result<PrenatalForm> {
    validate::required("name", &form.name, "name is required")?;
    Ok(form)
}

async fn get_prenatal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PrenatalId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.get_prenatal(id).await?))
}

async fn create_prenatal(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<PrenatalBody>,
) -> Result<impl IntoResponse> {
    let user = body
        .user_id
        .or_else(|| caller.0.as_ref().and_then(|p| p.user_id()));
    let info = state.store.create_prenatal(user, checked(body.form)?).await?;
    Ok((StatusCode::CREATED, ApiJson(info)))
}

async fn update_prenatal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PrenatalId>,
    ApiJson(form): ApiJson<PrenatalForm>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.update_prenatal(id, checked(form)?).await?))
}

async fn delete_prenatal(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<PrenatalId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Doctor, Role::Admin])?;
    state.store.delete_prenatal(id).await?;
    Ok(ApiJson(json!({ "message": "Prenatal info deleted successfully" })))
}

async fn immunization_for_user(
    State(state): State<AppState>,
    ApiPath(user): ApiPath<UserId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.immunization_for_user(user).await?))
}

async fn list_immunizations(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let all = state.store.list_immunizations().await?;
    if all.is_empty() {
        return Err(Error::not_found("immunization data", "any").into());
    }
    Ok(ApiJson(all))
}
