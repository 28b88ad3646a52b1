//! Registration repository implementation

use std::time::Instant;
use sqlx::PgPool;
use chrono::Utc;
use crate::models::registration::{Registration, RegistrationStatus, CreateRegistrationRequest};
use crate::utils::errors::SchoolDeskError;
use crate::utils::logging::log_database_operation;

const UNIQUE_EVENT_USER: &str = "registrations_event_user_key";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, SchoolDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, user_id, status, created_at FROM registrations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find the registration of a user for an event
    pub async fn find(&self, event_id: i64, user_id: i64) -> Result<Option<Registration>, SchoolDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, user_id, status, created_at FROM registrations WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Registrations of an event in creation order
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<Registration>, SchoolDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, user_id, status, created_at FROM registrations WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Registrations of a user, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Registration>, SchoolDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, user_id, status, created_at FROM registrations WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Insert a registration if the event still has a free seat.
    ///
    /// The event row is locked for the duration of the transaction, so
    /// concurrent inserts from other processes queue behind this one.
    pub async fn create_checked(
        &self,
        request: CreateRegistrationRequest,
        capacity: Option<i32>,
    ) -> Result<Registration, SchoolDeskError> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(request.event_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(SchoolDeskError::event_not_found(request.event_id));
        }

        if let Some(capacity) = capacity {
            let held: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'REJECTED'"
            )
            .bind(request.event_id)
            .fetch_one(&mut *tx)
            .await?;

            if held.0 >= i64::from(capacity) {
                return Err(SchoolDeskError::CapacityExceeded { event_id: request.event_id, capacity });
            }
        }

        let inserted = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (event_id, user_id, status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, user_id, status, created_at
            "#
        )
        .bind(request.event_id)
        .bind(request.user_id)
        .bind(request.status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await;

        let registration = match inserted {
            Ok(registration) => registration,
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(UNIQUE_EVENT_USER) => {
                return Err(SchoolDeskError::DuplicateRegistration {
                    event_id: request.event_id,
                    user_id: request.user_id,
                });
            }
            Err(e) => {
                log_database_operation("insert", "registrations", started.elapsed().as_millis() as u64, false);
                return Err(e.into());
            }
        };

        tx.commit().await?;
        log_database_operation("insert", "registrations", started.elapsed().as_millis() as u64, true);
        Ok(registration)
    }

    /// Update registration status
    pub async fn update_status(&self, id: i64, status: RegistrationStatus) -> Result<Registration, SchoolDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, user_id, status, created_at
            "#
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        registration.ok_or_else(|| SchoolDeskError::registration_not_found(id))
    }

    /// Delete registration
    pub async fn delete(&self, id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
