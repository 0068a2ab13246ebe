use crate::domain::{models::notification::NotificationLog, ports::NotificationLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteNotificationLogRepo {
    pool: SqlitePool,
}

impl SqliteNotificationLogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLogRepository for SqliteNotificationLogRepo {
    async fn log(&self, entry: &NotificationLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notification_logs (id, event_id, recipient, template_key, context_hash, status, sent_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&entry.id).bind(&entry.event_id).bind(&entry.recipient)
            .bind(&entry.template_key).bind(&entry.context_hash).bind(&entry.status).bind(entry.sent_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn has_been_sent(&self, recipient: &str, template_key: &str, context_hash: &str) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM notification_logs WHERE recipient = ? AND template_key = ? AND context_hash = ? AND status = 'SENT'"
        )
            .bind(recipient).bind(template_key).bind(context_hash)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<NotificationLog>, AppError> {
        sqlx::query_as::<_, NotificationLog>(
            "SELECT * FROM notification_logs WHERE event_id = ? ORDER BY sent_at ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
