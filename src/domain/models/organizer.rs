use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Organizers receive reminder and status-change notifications for their event.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Organizer {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Organizer {
    pub fn new(event_id: String, name: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            name,
            email,
            created_at: Utc::now(),
        }
    }
}
