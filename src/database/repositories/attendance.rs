//! Attendance repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use crate::models::attendance::{AttendanceRecord, AttendanceStatus, AttendanceFilter, CreateAttendanceRequest};
use crate::utils::errors::SchoolDeskError;

#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List records matching the filter, newest first
    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, SchoolDeskError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, student_id, class_id, date, status, created_at FROM attendance_records WHERE TRUE"
        );
        if let Some(student_id) = filter.student_id {
            builder.push(" AND student_id = ").push_bind(student_id);
        }
        if let Some(class_id) = filter.class_id {
            builder.push(" AND class_id = ").push_bind(class_id);
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND date <= ").push_bind(to);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder.push(" ORDER BY date DESC, id DESC");

        let records = builder
            .build_query_as::<AttendanceRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Record attendance
    pub async fn create(&self, request: CreateAttendanceRequest) -> Result<AttendanceRecord, SchoolDeskError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (student_id, class_id, date, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, class_id, date, status, created_at
            "#
        )
        .bind(request.student_id)
        .bind(request.class_id)
        .bind(request.date)
        .bind(request.status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Correct the status of a record
    pub async fn update_status(&self, id: i64, status: AttendanceStatus) -> Result<AttendanceRecord, SchoolDeskError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_records
            SET status = $2
            WHERE id = $1
            RETURNING id, student_id, class_id, date, status, created_at
            "#
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(SchoolDeskError::NotFound { entity: "Attendance record", id })
    }

    /// Delete record
    pub async fn delete(&self, id: i64) -> Result<(), SchoolDeskError> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SchoolDeskError::NotFound { entity: "Attendance record", id });
        }
        Ok(())
    }
}
