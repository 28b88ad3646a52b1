//! Attendance marking and grade entry

use std::sync::Arc;
use chrono::NaiveDate;
use crate::models::*;
use crate::store::{AttendanceStore, GradeStore};
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use super::auth::{can_correct_marks, can_record_marks, require, Actor};

#[derive(Clone)]
pub struct RecordService {
    attendance: Arc<dyn AttendanceStore>,
    grades: Arc<dyn GradeStore>,
}

impl RecordService {
    pub fn new(attendance: Arc<dyn AttendanceStore>, grades: Arc<dyn GradeStore>) -> Self {
        Self { attendance, grades }
    }

    /// Record one class session: a status per student
    pub async fn mark_attendance(
        &self,
        actor: &Actor,
        class_id: i64,
        date: NaiveDate,
        entries: &[(i64, AttendanceStatus)],
    ) -> Result<Vec<AttendanceRecord>> {
        require(can_record_marks(actor), actor, "mark attendance")?;

        let mut records = Vec::with_capacity(entries.len());
        for &(student_id, status) in entries {
            let record = self
                .attendance
                .create_attendance(CreateAttendanceRequest { student_id, class_id, date, status })
                .await?;
            records.push(record);
        }

        tracing::info!(
            class_id = class_id,
            date = %date,
            count = records.len(),
            teacher_id = actor.user_id,
            "Attendance marked"
        );
        Ok(records)
    }

    pub async fn correct_attendance(&self, actor: &Actor, record_id: i64, status: AttendanceStatus) -> Result<AttendanceRecord> {
        require(can_correct_marks(actor), actor, "edit attendance")?;
        let record = self.attendance.update_attendance(record_id, status).await?;
        log_admin_action(actor.user_id, "attendance_update", Some(&record_id.to_string()), Some(status.as_str()));
        Ok(record)
    }

    pub async fn delete_attendance(&self, actor: &Actor, record_id: i64) -> Result<()> {
        require(can_correct_marks(actor), actor, "delete attendance")?;
        self.attendance.delete_attendance(record_id).await?;
        log_admin_action(actor.user_id, "attendance_delete", Some(&record_id.to_string()), None);
        Ok(())
    }

    pub async fn record_grade(&self, actor: &Actor, request: CreateGradeRequest) -> Result<Grade> {
        require(can_record_marks(actor), actor, "record grades")?;
        request.validate()?;

        let grade = self.grades.create_grade(request).await?;
        tracing::info!(
            grade_id = grade.id,
            student_id = grade.student_id,
            subject = %grade.subject,
            teacher_id = actor.user_id,
            "Grade recorded"
        );
        Ok(grade)
    }

    pub async fn delete_grade(&self, actor: &Actor, grade_id: i64) -> Result<()> {
        require(can_correct_marks(actor), actor, "delete grades")?;
        self.grades.delete_grade(grade_id).await?;
        log_admin_action(actor.user_id, "grade_delete", Some(&grade_id.to_string()), None);
        Ok(())
    }
}
