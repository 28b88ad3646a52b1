//! Grade repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use crate::models::grade::{Grade, GradeFilter, CreateGradeRequest};
use crate::utils::errors::SchoolDeskError;

#[derive(Debug, Clone)]
pub struct GradeRepository {
    pool: PgPool,
}

impl GradeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List grades matching the filter, newest first
    pub async fn list(&self, filter: &GradeFilter) -> Result<Vec<Grade>, SchoolDeskError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, student_id, subject, term, score, letter_grade, remarks, created_at FROM grades WHERE TRUE"
        );
        if let Some(student_id) = filter.student_id {
            builder.push(" AND student_id = ").push_bind(student_id);
        }
        if let Some(term) = &filter.term {
            builder.push(" AND term = ").push_bind(term.clone());
        }
        if let Some(subject) = &filter.subject {
            builder.push(" AND LOWER(subject) = LOWER(").push_bind(subject.clone()).push(")");
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let grades = builder
            .build_query_as::<Grade>()
            .fetch_all(&self.pool)
            .await?;

        Ok(grades)
    }

    /// Record a grade
    pub async fn create(&self, request: CreateGradeRequest) -> Result<Grade, SchoolDeskError> {
        let grade = sqlx::query_as::<_, Grade>(
            r#"
            INSERT INTO grades (student_id, subject, term, score, letter_grade, remarks, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, student_id, subject, term, score, letter_grade, remarks, created_at
            "#
        )
        .bind(request.student_id)
        .bind(request.subject)
        .bind(request.term)
        .bind(request.score)
        .bind(request.letter_grade)
        .bind(request.remarks)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(grade)
    }

    /// Delete grade
    pub async fn delete(&self, id: i64) -> Result<(), SchoolDeskError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SchoolDeskError::NotFound { entity: "Grade", id });
        }
        Ok(())
    }
}
