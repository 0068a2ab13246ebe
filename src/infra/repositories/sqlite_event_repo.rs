use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, slug, title, description, location, timezone, begin_date, registration_deadline, min_attendees, max_attendees, offline_attendees, queue_size, status, automatic_status_change, takes_place_reminder_sent, cancellation_deadline_reminder_sent, organizers_notified_minimum_reached, version, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = ?").bind(slug).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let updated = sqlx::query_as::<_, Event>(
            "UPDATE events SET slug=?, title=?, description=?, location=?, timezone=?, begin_date=?, registration_deadline=?, min_attendees=?, max_attendees=?, offline_attendees=?, queue_size=?, status=?, automatic_status_change=?, takes_place_reminder_sent=?, cancellation_deadline_reminder_sent=?, organizers_notified_minimum_reached=?, version = version + 1
             WHERE id=? AND version=?
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
        let result = sqlx::query("DELETE FROM events WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
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
            "SELECT * FROM events WHERE status = 'CONFIRMED' AND takes_place_reminder_sent = FALSE AND begin_date IS NOT NULL AND begin_date > ? AND begin_date <= ?"
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
