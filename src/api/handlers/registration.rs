use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::CreateRegistrationRequest;
use crate::api::dtos::responses::RegistrationCreatedResponse;
use crate::domain::services::registration_queue::NewRegistrationRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_registration(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateRegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let created = state.queue_manager.register(&event.id, NewRegistrationRequest {
        attendee_name: payload.name,
        attendee_email: payload.email,
        seats: payload.seats.unwrap_or(1),
        nonbinding: payload.nonbinding.unwrap_or(false),
    }).await?;

    info!("Registration {} accepted for event {}", created.id, event.id);

    // A freshly filled event should confirm right away instead of waiting
    // for the next scheduler tick. The registration is already persisted,
    // so an evaluation failure is logged rather than returned.
    if created.is_regular() && event.automatic_status_change {
        if let Err(e) = state.status_service.process(&event.id, Utc::now()).await {
            warn!("Synchronous status evaluation for event {} failed: {}", event.id, e);
        }
    }

    Ok((StatusCode::CREATED, Json(RegistrationCreatedResponse {
        registration_id: created.id,
        queue_status: created.queue_status,
        management_token: created.management_token,
    })))
}

pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let registrations = state.registration_repo.list_by_event(&event.id).await?;
    Ok(Json(registrations))
}

pub async fn get_registration_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.registration_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;
    Ok(Json(registration))
}

pub async fn cancel_registration_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.registration_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;

    state.queue_manager.remove_registration(&registration.id).await?;
    Ok(Json(json!({ "status": "CANCELLED" })))
}
