use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, slug, title, description, location, timezone, begin_date, registration_deadline, min_attendees, max_attendees, offline_attendees, queue_size, status, automatic_status_change, takes_place_reminder_sent, cancellation_deadline_reminder_sent, organizers_notified_minimum_reached, version, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING *"
        )
            .bind(&event.id).bind(&event.slug).bind(&event.title).bind(&event.description)
            .bind(&event.location).bind(&event.timezone).bind(event.begin_date).bind(event.registration_deadline)
            .bind(event.min_attendees).bind(event.max_attendees).bind(event.offline_attendees).bind(event.queue_size)
            .bind(&event.status).bind(event.automatic_status_change).bind(event.takes_place_reminder_sent)
            .bind(event.cancellation_deadline_reminder_sent).bind(event.organizers_notified_minimum_reached)
            .bind(event.version).bind(event.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1").bind(slug).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let updated = sqlx::query_as::<_, Event>(
            "UPDATE events SET slug=$1, title=$2, description=$3, location=$4, timezone=$5, begin_date=$6, registration_deadline=$7, min_attendees=$8, max_attendees=$9, offline_attendees=$10, queue_size=$11, status=$12, automatic_status_change=$13, takes_place_reminder_sent=$14, cancellation_deadline_reminder_sent=$15, organizers_notified_minimum_reached=$16, version = version + 1
             WHERE id=$17 AND version=$18
             RETURNING *"
        )
            .bind(&event.slug).bind(&event.title).bind(&event.description).bind(&event.location)
            .bind(&event.timezone).bind(event.begin_date).bind(event.registration_deadline)
            .bind(event.min_attendees).bind(event.max_attendees).bind(event.offline_attendees).bind(event.queue_size)
            .bind(&event.status).bind(event.automatic_status_change).bind(event.takes_place_reminder_sent)
            .bind(event.cancellation_deadline_reminder_sent).bind(event.organizers_notified_minimum_reached)
            .bind(&event.id).bind(event.version)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        updated.ok_or_else(|| AppError::Conflict(format!("Event {} was modified concurrently", event.id)))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Event not found".into())); }
        Ok(())
    }

    async fn find_due_for_automatic_evaluation(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE status = 'PLANNED' AND automatic_status_change = TRUE"
        )
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_takes_place_reminder_candidates(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE status = 'CONFIRMED' AND takes_place_reminder_sent = FALSE AND begin_date IS NOT NULL AND begin_date > $1 AND begin_date <= $2"
        )
            .bind(now).bind(until)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_cancellation_reminder_candidates(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE status = 'PLANNED' AND cancellation_deadline_reminder_sent = FALSE AND begin_date IS NOT NULL"
        )
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
