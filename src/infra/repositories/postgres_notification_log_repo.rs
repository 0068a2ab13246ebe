use crate::domain::{models::notification::NotificationLog, ports::NotificationLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresNotificationLogRepo {
    pool: PgPool,
}

impl PostgresNotificationLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLogRepository for PostgresNotificationLogRepo {
    async fn log(&self, entry: &NotificationLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notification_logs (id, event_id, recipient, template_key, context_hash, status, sent_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(&entry.id).bind(&entry.event_id).bind(&entry.recipient)
            .bind(&entry.template_key).bind(&entry.context_hash).bind(&entry.status).bind(entry.sent_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn has_been_sent(&self, recipient: &str, template_key: &str, context_hash: &str) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM notification_logs WHERE recipient = $1 AND template_key = $2 AND context_hash = $3 AND status = 'SENT'"
        )
            .bind(recipient).bind(template_key).bind(context_hash)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<NotificationLog>, AppError> {
        sqlx::query_as::<_, NotificationLog>(
            "SELECT * FROM notification_logs WHERE event_id = $1 ORDER BY sent_at ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
