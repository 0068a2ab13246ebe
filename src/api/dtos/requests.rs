use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub begin_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub min_attendees: Option<i32>,
    pub max_attendees: Option<i32>,
    pub offline_attendees: Option<i32>,
    pub queue_size: Option<i32>,
    pub automatic_status_change: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub begin_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub min_attendees: Option<i32>,
    pub max_attendees: Option<i32>,
    pub offline_attendees: Option<i32>,
    pub queue_size: Option<i32>,
    pub automatic_status_change: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateRegistrationRequest {
    pub name: String,
    pub email: String,
    pub seats: Option<i32>,
    pub nonbinding: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateOrganizerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct CreateSpeakerRequest {
    pub name: String,
    pub email: Option<String>,
    pub cancellation_period_days: Option<i32>,
}
