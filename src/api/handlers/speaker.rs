use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::requests::CreateSpeakerRequest;
use crate::domain::models::speaker::Speaker;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_speaker(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateSpeakerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let cancellation_period_days = payload.cancellation_period_days.unwrap_or(0);
    if cancellation_period_days < 0 {
        return Err(AppError::Validation("Cancellation period must not be negative".into()));
    }

    let speaker = Speaker::new(event.id, payload.name, payload.email, cancellation_period_days);
    let created = state.speaker_repo.create(&speaker).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_speakers(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let speakers = state.speaker_repo.list_by_event(&event.id).await?;
    Ok(Json(speakers))
}
