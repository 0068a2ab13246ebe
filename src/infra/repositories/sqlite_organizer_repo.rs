use crate::domain::{models::organizer::Organizer, ports::OrganizerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteOrganizerRepo {
    pool: SqlitePool,
}

impl SqliteOrganizerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizerRepository for SqliteOrganizerRepo {
    async fn create(&self, organizer: &Organizer) -> Result<Organizer, AppError> {
        sqlx::query_as::<_, Organizer>(
            "INSERT INTO organizers (id, event_id, name, email, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&organizer.id).bind(&organizer.event_id).bind(&organizer.name)
            .bind(&organizer.email).bind(organizer.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Organizer>, AppError> {
        sqlx::query_as::<_, Organizer>(
            "SELECT * FROM organizers WHERE event_id = ? ORDER BY created_at ASC, id ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM organizers WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Organizer not found".into())); }
        Ok(())
    }
}
