use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateEventRequest, UpdateEventRequest};
use crate::domain::models::event::{Event, NewEventParams};
use crate::domain::services::registration_queue::queue_snapshot;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let min_attendees = payload.min_attendees.unwrap_or(0);
    let max_attendees = payload.max_attendees.unwrap_or(0);
    if min_attendees < 0 || max_attendees < 0 {
        return Err(AppError::Validation("Attendee limits must not be negative".into()));
    }

    let event = Event::new(NewEventParams {
        slug: payload.slug,
        title: payload.title,
        description: payload.description.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
        timezone: payload.timezone.unwrap_or_else(|| "UTC".to_string()),
        begin_date: payload.begin_date,
        registration_deadline: payload.registration_deadline,
        min_attendees,
        max_attendees,
        offline_attendees: payload.offline_attendees.unwrap_or(0),
        queue_size: payload.queue_size.unwrap_or(0),
        automatic_status_change: payload.automatic_status_change.unwrap_or(false),
    });

    let created = state.event_repo.create(&event).await?;
    info!("Created event {} ({})", created.id, created.slug);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list().await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(title) = payload.title { event.title = title; }
    if let Some(description) = payload.description { event.description = description; }
    if let Some(location) = payload.location { event.location = location; }
    if let Some(timezone) = payload.timezone { event.timezone = timezone; }
    if let Some(begin_date) = payload.begin_date { event.begin_date = Some(begin_date); }
    if let Some(deadline) = payload.registration_deadline { event.registration_deadline = Some(deadline); }
    if let Some(min_attendees) = payload.min_attendees { event.min_attendees = min_attendees; }
    if let Some(max_attendees) = payload.max_attendees { event.max_attendees = max_attendees; }
    if let Some(offline_attendees) = payload.offline_attendees { event.offline_attendees = offline_attendees; }
    if let Some(queue_size) = payload.queue_size { event.queue_size = queue_size; }
    if let Some(flag) = payload.automatic_status_change { event.automatic_status_change = flag; }

    let updated = state.event_repo.update(&event).await?;
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    state.event_repo.delete(&event.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_slug(&slug).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let registrations = state.registration_repo.list_active_by_event(&event.id).await?;
    Ok(Json(queue_snapshot(&event, &registrations)))
}
