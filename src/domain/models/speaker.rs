use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Speaker {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: Option<String>,
    /// Days before the event begin date up to which the speaker may still
    /// cancel. 0 means no cancellation period is configured.
    pub cancellation_period_days: i32,
    pub created_at: DateTime<Utc>,
}

impl Speaker {
    pub fn new(event_id: String, name: String, email: Option<String>, cancellation_period_days: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            name,
            email,
            cancellation_period_days,
            created_at: Utc::now(),
        }
    }
}
