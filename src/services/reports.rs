//! Reports and role dashboards
//!
//! Fetches the relevant records through the stores and feeds them to the
//! aggregation functions.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use crate::config::ReportingConfig;
use crate::models::*;
use crate::store::{AttendanceStore, EventStore, GradeStore, UserStore};
use crate::utils::errors::{SchoolDeskError, Result};
use super::aggregation::{
    attendance_stats, gpa, grade_distribution, grade_summary, recent, registration_counts,
    subject_means, subject_summaries, AttendanceStats, Gpa, GradeDistribution, GradeSummary,
    RegistrationCounts, SubjectSummary,
};
use super::auth::{can_view_student, require, Actor};

#[derive(Debug, Clone, Serialize)]
pub struct StudentReport {
    pub student_id: i64,
    pub student_name: String,
    pub term: Option<String>,
    pub attendance: AttendanceStats,
    pub grades: GradeSummary,
    pub gpa: Gpa,
    pub subjects: Vec<SubjectSummary>,
    pub distribution: GradeDistribution,
    pub recent_grades: Vec<Grade>,
    pub recent_attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassAttendanceReport {
    pub class_id: i64,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub overall: AttendanceStats,
    /// Per student, ordered by student id
    pub students: Vec<StudentAttendance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendance {
    pub student_id: i64,
    pub stats: AttendanceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizedEvent {
    pub event_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub capacity: Option<i32>,
    pub counts: RegistrationCounts,
}

/// Dashboard cards, shaped by the viewer's role
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Admin {
        events: usize,
        registrations: RegistrationCounts,
        attendance: AttendanceStats,
        grades: GradeSummary,
        distribution: GradeDistribution,
    },
    Teacher {
        organized: Vec<OrganizedEvent>,
    },
    Parent {
        children: Vec<StudentReport>,
    },
    Student {
        report: StudentReport,
        registrations: Vec<Registration>,
    },
}

#[derive(Clone)]
pub struct ReportService {
    events: Arc<dyn EventStore>,
    attendance: Arc<dyn AttendanceStore>,
    grades: Arc<dyn GradeStore>,
    users: Arc<dyn UserStore>,
    config: ReportingConfig,
}

impl ReportService {
    pub fn new(
        events: Arc<dyn EventStore>,
        attendance: Arc<dyn AttendanceStore>,
        grades: Arc<dyn GradeStore>,
        users: Arc<dyn UserStore>,
        config: ReportingConfig,
    ) -> Self {
        Self { events, attendance, grades, users, config }
    }

    /// A student's attendance and grades, optionally limited to one term.
    ///
    /// With `baseline_term` set, subject trends compare against that term's
    /// subject means; otherwise trends are unknown.
    pub async fn student_report(
        &self,
        actor: &Actor,
        student_id: i64,
        term: Option<String>,
        baseline_term: Option<String>,
    ) -> Result<StudentReport> {
        let student = self
            .users
            .get_user(student_id)
            .await?
            .ok_or_else(|| SchoolDeskError::user_not_found(student_id))?;
        if student.role != Role::Student {
            return Err(SchoolDeskError::Validation(format!("User {} is not a student", student_id)));
        }
        require(can_view_student(actor, &student), actor, "view this student's report")?;

        self.build_student_report(&student, term, baseline_term).await
    }

    async fn build_student_report(
        &self,
        student: &User,
        term: Option<String>,
        baseline_term: Option<String>,
    ) -> Result<StudentReport> {
        let attendance = self
            .attendance
            .list_attendance(&AttendanceFilter::for_student(student.id))
            .await?;
        let grades = self
            .grades
            .list_grades(&GradeFilter::for_student(student.id).with_term(term.clone()))
            .await?;

        let baseline: HashMap<String, f64> = match baseline_term {
            Some(baseline_term) => {
                let previous = self
                    .grades
                    .list_grades(&GradeFilter::for_student(student.id).with_term(Some(baseline_term)))
                    .await?;
                subject_means(&previous)
            }
            None => HashMap::new(),
        };

        debug!(
            student_id = student.id,
            attendance = attendance.len(),
            grades = grades.len(),
            "Building student report"
        );

        let limit = self.config.recent_limit;
        Ok(StudentReport {
            student_id: student.id,
            student_name: student.name.clone(),
            term,
            attendance: attendance_stats(&attendance),
            grades: grade_summary(&grades),
            gpa: gpa(&grades),
            subjects: subject_summaries(&grades, &baseline, self.config.trend_threshold),
            distribution: grade_distribution(&grades),
            recent_grades: recent(&grades, limit).to_vec(),
            recent_attendance: recent(&attendance, limit).to_vec(),
        })
    }

    /// Attendance of one class over an optional date range; staff only
    pub async fn class_attendance_report(
        &self,
        actor: &Actor,
        class_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ClassAttendanceReport> {
        require(actor.role.is_staff(), actor, "view class attendance")?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(SchoolDeskError::Validation("Date range start is after its end".to_string()));
            }
        }

        let records = self
            .attendance
            .list_attendance(&AttendanceFilter::for_class(class_id).between(from, to))
            .await?;

        let mut by_student: HashMap<i64, Vec<&AttendanceRecord>> = HashMap::new();
        for record in &records {
            by_student.entry(record.student_id).or_default().push(record);
        }
        let mut students: Vec<StudentAttendance> = by_student
            .into_iter()
            .map(|(student_id, records)| StudentAttendance {
                student_id,
                stats: attendance_stats(records),
            })
            .collect();
        students.sort_by_key(|s| s.student_id);

        Ok(ClassAttendanceReport {
            class_id,
            from,
            to,
            overall: attendance_stats(&records),
            students,
        })
    }

    pub async fn dashboard(&self, actor: &Actor) -> Result<Dashboard> {
        match actor.role {
            Role::Admin => self.admin_dashboard().await,
            Role::Teacher => self.teacher_dashboard(actor).await,
            Role::Parent => {
                let mut children = Vec::new();
                for child in self.users.list_children(actor.user_id).await? {
                    children.push(self.build_student_report(&child, None, None).await?);
                }
                Ok(Dashboard::Parent { children })
            }
            Role::Student => {
                let report = self.student_report(actor, actor.user_id, None, None).await?;
                let registrations = self.events.list_user_registrations(actor.user_id).await?;
                Ok(Dashboard::Student { report, registrations })
            }
        }
    }

    async fn admin_dashboard(&self) -> Result<Dashboard> {
        let events = self.events.list_events().await?;
        let mut registrations = Vec::new();
        for event in &events {
            registrations.extend(self.events.list_registrations(event.id).await?);
        }
        let attendance = self.attendance.list_attendance(&AttendanceFilter::default()).await?;
        let grades = self.grades.list_grades(&GradeFilter::default()).await?;

        Ok(Dashboard::Admin {
            events: events.len(),
            registrations: registration_counts(&registrations),
            attendance: attendance_stats(&attendance),
            grades: grade_summary(&grades),
            distribution: grade_distribution(&grades),
        })
    }

    async fn teacher_dashboard(&self, actor: &Actor) -> Result<Dashboard> {
        let mut organized = Vec::new();
        for event in self.events.list_events().await? {
            if event.organizer_id != actor.user_id {
                continue;
            }
            let registrations = self.events.list_registrations(event.id).await?;
            organized.push(OrganizedEvent {
                event_id: event.id,
                title: event.title,
                date: event.date,
                capacity: event.capacity,
                counts: registration_counts(&registrations),
            });
        }
        Ok(Dashboard::Teacher { organized })
    }
}
