//! Doctor specialties and visit purposes.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;

use clinic_core::catalog::SpecialtyInput;
use clinic_core::validate;
use clinic_core::{PurposeId, Role, SpecialtyId};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

/// Catalog routes. Reads are open to any caller; writes need an admin.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/doctor-specialties",
            get(list_specialties).post(create_specialty),
        )
        .route(
            "/doctor-specialties/{id}",
            get(get_specialty)
                .put(update_specialty)
                .delete(delete_specialty),
        )
        .route("/purposes", get(offered_purposes).post(create_purpose))
        .route(
            "/purposes/{id}",
            get(purposes_for_specialty)
                .put(rename_purpose)
                .delete(delete_purpose),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpecialtyBody {
    specialty_name: String,
    description: Option<String>,
}

impl SpecialtyBody {
    fn into_input(self) -> Result<SpecialtyInput> {
        let name = validate::required(
            "specialty_name",
            &self.specialty_name,
            "Specialty name is required",
        )?;
        Ok(SpecialtyInput {
            specialty_name: name.to_string(),
            description: self.description,
        })
    }
}

async fn list_specialties(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.list_specialties().await?))
}

async fn get_specialty(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.get_specialty(id).await?))
}

async fn create_specialty(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<SpecialtyBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    let specialty = state.store.create_specialty(body.into_input()?).await?;
    Ok((StatusCode::CREATED, ApiJson(specialty)))
}

async fn update_specialty(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<SpecialtyId>,
    ApiJson(body): ApiJson<SpecialtyBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    Ok(ApiJson(
        state.store.update_specialty(id, body.into_input()?).await?,
    ))
}

async fn delete_specialty(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<SpecialtyId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    state.store.delete_specialty(id).await?;
    Ok(ApiJson(json!({ "message": "Specialty deleted successfully" })))
}

// `/purposes/{id}` names a specialty on GET and a purpose otherwise.
async fn purposes_for_specialty(
    State(state): State<AppState>,
    ApiPath(specialty): ApiPath<SpecialtyId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.purposes_for_specialty(specialty).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PurposeBody {
    specialty_id: Option<SpecialtyId>,
    purpose_name: String,
}

async fn create_purpose(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<PurposeBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    let (Some(specialty), false) = (body.specialty_id, body.purpose_name.trim().is_empty()) else {
        return Err(clinic_core::Error::validation(
            "specialty_id and purpose_name are required",
        )
        .into());
    };
    let purpose = state
        .store
        .create_purpose(specialty, body.purpose_name.trim())
        .await?;
    Ok((StatusCode::CREATED, ApiJson(purpose)))
}

async fn rename_purpose(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<PurposeId>,
    ApiJson(body): ApiJson<PurposeBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    let name = validate::required("purpose_name", &body.purpose_name, "purpose_name is required")?;
    Ok(ApiJson(state.store.rename_purpose(id, name).await?))
}

async fn delete_purpose(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<PurposeId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    state.store.delete_purpose(id).await?;
    Ok(ApiJson(json!({ "message": "Purpose deleted successfully" })))
}

async fn offered_purposes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.offered_purposes().await?))
}
