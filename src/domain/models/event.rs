use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

pub const STATUS_PLANNED: &str = "PLANNED";
pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// Parsed event lifecycle status. `Confirmed` and `Cancelled` are terminal;
/// the status engine only ever moves an event out of `Planned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Planned,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    /// Any stored value outside the three known kinds is data corruption
    /// and must surface as an error, never be coerced.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw {
            STATUS_PLANNED => Ok(EventStatus::Planned),
            STATUS_CONFIRMED => Ok(EventStatus::Confirmed),
            STATUS_CANCELLED => Ok(EventStatus::Cancelled),
            other => Err(AppError::InvalidStatusKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planned => STATUS_PLANNED,
            EventStatus::Confirmed => STATUS_CONFIRMED,
            EventStatus::Cancelled => STATUS_CANCELLED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub timezone: String,
    pub begin_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub min_attendees: i32,
    /// 0 means unlimited capacity.
    pub max_attendees: i32,
    /// Seats recorded manually by the organizer, not tracked as registrations.
    pub offline_attendees: i32,
    /// 0 disables the waiting list. Positive values are an advisory hint,
    /// never enforced as a hard cap.
    pub queue_size: i32,
    pub status: String,
    pub automatic_status_change: bool,
    pub takes_place_reminder_sent: bool,
    pub cancellation_deadline_reminder_sent: bool,
    pub organizers_notified_minimum_reached: bool,
    /// Optimistic concurrency counter, bumped on every update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub timezone: String,
    pub begin_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub min_attendees: i32,
    pub max_attendees: i32,
    pub offline_attendees: i32,
    pub queue_size: i32,
    pub automatic_status_change: bool,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug: params.slug,
            title: params.title,
            description: params.description,
            location: params.location,
            timezone: params.timezone,
            begin_date: params.begin_date,
            registration_deadline: params.registration_deadline,
            min_attendees: params.min_attendees,
            max_attendees: params.max_attendees,
            offline_attendees: params.offline_attendees,
            queue_size: params.queue_size,
            status: STATUS_PLANNED.to_string(),
            automatic_status_change: params.automatic_status_change,
            takes_place_reminder_sent: false,
            cancellation_deadline_reminder_sent: false,
            organizers_notified_minimum_reached: false,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn parsed_status(&self) -> Result<EventStatus, AppError> {
        EventStatus::parse(&self.status)
    }

    pub fn has_waiting_list(&self) -> bool {
        self.queue_size > 0
    }
}
