use crate::domain::models::{
    event::Event, notification::NotificationLog, organizer::Organizer,
    registration::Registration, speaker::Speaker,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    /// Optimistic write: matches the version the event was read with and
    /// bumps it. A stale version yields `AppError::Conflict`.
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Planned events that opted into automatic status changes.
    async fn find_due_for_automatic_evaluation(&self) -> Result<Vec<Event>, AppError>;
    /// Confirmed events beginning inside (now, until] whose takes-place
    /// reminder has not gone out yet.
    async fn find_takes_place_reminder_candidates(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, AppError>;
    /// Planned events with a begin date whose cancellation-deadline
    /// reminder has not gone out yet.
    async fn find_cancellation_reminder_candidates(&self) -> Result<Vec<Event>, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Registration>, AppError>;
    /// Non-removed registrations, ordered by (created_at, id) ascending —
    /// the FIFO order the waiting-list promotion relies on.
    async fn list_active_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError>;
    /// Full history including removed registrations.
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError>;
    async fn update(&self, registration: &Registration) -> Result<Registration, AppError>;
}

#[async_trait]
pub trait OrganizerRepository: Send + Sync {
    async fn create(&self, organizer: &Organizer) -> Result<Organizer, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Organizer>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SpeakerRepository: Send + Sync {
    async fn create(&self, speaker: &Speaker) -> Result<Speaker, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Speaker>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationLogRepository: Send + Sync {
    async fn log(&self, entry: &NotificationLog) -> Result<(), AppError>;
    async fn has_been_sent(
        &self,
        recipient: &str,
        template_key: &str,
        context_hash: &str,
    ) -> Result<bool, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<NotificationLog>, AppError>;
}

/// Delivery boundary. The core never renders message content; it selects a
/// template key and hands over structured parameters.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        event: &Event,
        recipient: &str,
        template_key: &str,
        params: &Value,
    ) -> Result<(), AppError>;
}
