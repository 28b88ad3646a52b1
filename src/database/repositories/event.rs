//! Event repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::event::{Event, CreateEventRequest, UpdateEventRequest};
use crate::utils::errors::SchoolDeskError;

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, SchoolDeskError> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, category, location, date, start_time, end_time, capacity,
                                registration_deadline, is_public, requires_approval, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING id, title, description, category, location, date, start_time, end_time, capacity,
                      registration_deadline, is_public, requires_approval, organizer_id, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.category)
        .bind(request.location)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.capacity)
        .bind(request.registration_deadline)
        .bind(request.is_public)
        .bind(request.requires_approval)
        .bind(request.organizer_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, SchoolDeskError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, category, location, date, start_time, end_time, capacity,
                   registration_deadline, is_public, requires_approval, organizer_id, created_at, updated_at
            FROM events WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event; unset fields keep their value, capacity and deadline may be cleared
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, SchoolDeskError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                location = COALESCE($5, location),
                date = COALESCE($6, date),
                start_time = COALESCE($7, start_time),
                end_time = COALESCE($8, end_time),
                capacity = CASE WHEN $9 THEN $10 ELSE capacity END,
                registration_deadline = CASE WHEN $11 THEN $12 ELSE registration_deadline END,
                is_public = COALESCE($13, is_public),
                requires_approval = COALESCE($14, requires_approval),
                updated_at = $15
            WHERE id = $1
            RETURNING id, title, description, category, location, date, start_time, end_time, capacity,
                      registration_deadline, is_public, requires_approval, organizer_id, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.category)
        .bind(request.location)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.capacity.is_some())
        .bind(request.capacity.flatten())
        .bind(request.registration_deadline.is_some())
        .bind(request.registration_deadline.flatten())
        .bind(request.is_public)
        .bind(request.requires_approval)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or_else(|| SchoolDeskError::event_not_found(id))
    }

    /// Delete event; registrations cascade
    pub async fn delete(&self, id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List all events in date order
    pub async fn list(&self) -> Result<Vec<Event>, SchoolDeskError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, category, location, date, start_time, end_time, capacity,
                   registration_deadline, is_public, requires_approval, organizer_id, created_at, updated_at
            FROM events ORDER BY date ASC, start_time ASC, id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, SchoolDeskError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
