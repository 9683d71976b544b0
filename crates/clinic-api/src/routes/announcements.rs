//! Admin announcements.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;

use clinic_core::announcement::{AnnouncementUpdate, NewAnnouncement};
use clinic_core::{AdminId, AnnouncementId, Error, Role};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, Caller};
use crate::state::AppState;

/// Announcement routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(list).post(create))
        .route("/announcements/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnnouncementBody {
    title: String,
    description: String,
    created_by: Option<AdminId>,
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(body): ApiJson<AnnouncementBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    let created_by = body
        .created_by
        .or_else(|| caller.0.as_ref().and_then(|p| p.admin_id()))
        .ok_or_else(|| Error::validation("Title, description, and created_by are required"))?;
    let announcement = state
        .store
        .create_announcement(NewAnnouncement::new(
            &body.title,
            &body.description,
            created_by,
        )?)
        .await?;
    tracing::info!(announcement_id = %announcement.id, "created announcement");
    Ok((
        StatusCode::CREATED,
        ApiJson(json!({
            "message": "Announcement created successfully",
            "announcement": announcement,
        })),
    ))
}

async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.list_announcements().await?))
}

async fn fetch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> Result<impl IntoResponse> {
    Ok(ApiJson(state.store.get_announcement(id).await?))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AnnouncementId>,
    ApiJson(body): ApiJson<AnnouncementBody>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    let update = AnnouncementUpdate::new(&body.title, &body.description)?;
    let announcement = state.store.update_announcement(id, update).await?;
    Ok(ApiJson(json!({
        "message": "Announcement updated successfully",
        "announcement": announcement,
    })))
}

async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> Result<impl IntoResponse> {
    caller.require(&[Role::Admin])?;
    state.store.delete_announcement(id).await?;
    Ok(ApiJson(json!({ "message": "Announcement deleted successfully" })))
}
