use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use rand::{distributions::Alphanumeric, Rng};

pub const QUEUE_REGULAR: &str = "REGULAR";
pub const QUEUE_WAITING_LIST: &str = "WAITING_LIST";
pub const QUEUE_NONBINDING_RESERVATION: &str = "NONBINDING_RESERVATION";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub seats: i32,
    pub queue_status: String,
    /// Token for the self-service cancellation link.
    pub management_token: String,
    /// Soft-delete marker. Removed registrations stay in the table for
    /// history but are excluded from all counts and promotion.
    pub removed: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewRegistrationParams {
    pub event_id: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub seats: i32,
    pub queue_status: String,
}

impl Registration {
    pub fn new(params: NewRegistrationParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            attendee_name: params.attendee_name,
            attendee_email: params.attendee_email,
            seats: params.seats,
            queue_status: params.queue_status,
            management_token: token,
            removed: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_regular(&self) -> bool {
        self.queue_status == QUEUE_REGULAR
    }

    pub fn is_waiting(&self) -> bool {
        self.queue_status == QUEUE_WAITING_LIST
    }
}
