use crate::domain::{models::speaker::Speaker, ports::SpeakerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSpeakerRepo {
    pool: PgPool,
}

impl PostgresSpeakerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeakerRepository for PostgresSpeakerRepo {
    async fn create(&self, speaker: &Speaker) -> Result<Speaker, AppError> {
        sqlx::query_as::<_, Speaker>(
            "INSERT INTO speakers (id, event_id, name, email, cancellation_period_days, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        )
            .bind(&speaker.id).bind(&speaker.event_id).bind(&speaker.name)
            .bind(&speaker.email).bind(speaker.cancellation_period_days).bind(speaker.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Speaker>, AppError> {
        sqlx::query_as::<_, Speaker>(
            "SELECT * FROM speakers WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Speaker not found".into())); }
        Ok(())
    }
}
