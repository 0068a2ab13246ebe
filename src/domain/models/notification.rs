use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use sha2::{Digest, Sha256};

pub const TEMPLATE_TAKES_PLACE_REMINDER: &str = "TAKES_PLACE_REMINDER";
pub const TEMPLATE_CANCELLATION_DEADLINE_REMINDER: &str = "CANCELLATION_DEADLINE_REMINDER";
pub const TEMPLATE_EVENT_CONFIRMED: &str = "EVENT_CONFIRMED";
pub const TEMPLATE_EVENT_CANCELLED: &str = "EVENT_CANCELLED";
pub const TEMPLATE_MINIMUM_REACHED: &str = "MINIMUM_REACHED";
pub const TEMPLATE_WAITLIST_PROMOTED: &str = "WAITLIST_PROMOTED";

pub const LOG_STATUS_SENT: &str = "SENT";
pub const LOG_STATUS_SKIPPED_DUPLICATE: &str = "SKIPPED_DUPLICATE";
pub const LOG_STATUS_FAILED: &str = "FAILED";

/// Ledger entry recording one dispatch attempt. The (recipient, template,
/// context hash) triple is the dedup key that keeps a retried pass from
/// re-notifying recipients who already got their copy.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct NotificationLog {
    pub id: String,
    pub event_id: String,
    pub recipient: String,
    pub template_key: String,
    pub context_hash: String,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl NotificationLog {
    pub fn new(event_id: &str, recipient: &str, template_key: &str, context_hash: &str, status: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            recipient: recipient.to_string(),
            template_key: template_key.to_string(),
            context_hash: context_hash.to_string(),
            status: status.to_string(),
            sent_at: Utc::now(),
        }
    }
}

/// Stable hash over the dedup key. Deliberately excludes per-run parameters
/// like days-until-begin so retries on a later run still deduplicate.
pub fn context_hash(template_key: &str, event_id: &str, recipient: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template_key.as_bytes());
    hasher.update(event_id.as_bytes());
    hasher.update(recipient.as_bytes());
    hex::encode(hasher.finalize())
}
