use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{event, health, organizer, registration, speaker};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/{slug}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/v1/events/{slug}/availability", get(event::get_availability))

        // Organizers & Speakers
        .route("/api/v1/events/{slug}/organizers", post(organizer::create_organizer).get(organizer::list_organizers))
        .route("/api/v1/events/{slug}/speakers", post(speaker::create_speaker).get(speaker::list_speakers))

        // Public Registration Flow
        .route("/api/v1/events/{slug}/register", post(registration::create_registration))
        .route("/api/v1/events/{slug}/registrations", get(registration::list_registrations))

        // Attendee Self-Service
        .route("/api/v1/registrations/manage/{token}", get(registration::get_registration_by_token))
        .route("/api/v1/registrations/manage/{token}/cancel", post(registration::cancel_registration_by_token))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
