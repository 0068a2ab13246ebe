use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::CreateOrganizerRequest;
use crate::domain::models::organizer::Organizer;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_organizer(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateOrganizerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let organizer = Organizer::new(event.id, payload.name, payload.email);
    let created = state.organizer_repo.create(&organizer).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_organizers(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let organizers = state.organizer_repo.list_by_event(&event.id).await?;
    Ok(Json(organizers))
}
