//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::SchoolDeskError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, guardian_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, role, guardian_id, created_at
            "#
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.role)
        .bind(request.guardian_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                SchoolDeskError::Validation(format!("Email already in use: {}", request.email))
            }
            other => other.into(),
        })?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, SchoolDeskError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, guardian_id, created_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Students linked to a guardian
    pub async fn list_children(&self, guardian_id: i64) -> Result<Vec<User>, SchoolDeskError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, guardian_id, created_at FROM users WHERE guardian_id = $1 AND role = 'STUDENT' ORDER BY id ASC"
        )
        .bind(guardian_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
