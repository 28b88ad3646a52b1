//! In-memory store
//!
//! Backs tests and embedded use. All collections live behind one mutex, so
//! every trait call observes and mutates a consistent snapshot.

use std::sync::{Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::Utc;
use crate::models::*;
use crate::utils::errors::{SchoolDeskError, Result};
use super::{AttendanceStore, EventStore, GradeStore, UserStore};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
    attendance: Vec<AttendanceRecord>,
    grades: Vec<Grade>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic mid-update cannot leave a half-written row: every mutation is
        // a single push, retain or field assignment.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.tables().events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let mut events = self.tables().events.clone();
        events.sort_by(|a, b| (a.date, a.start_time, a.id).cmp(&(b.date, b.start_time, b.id)));
        Ok(events)
    }

    async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        let mut tables = self.tables();
        let now = Utc::now();
        let event = Event {
            id: tables.allocate_id(),
            title: request.title,
            description: request.description,
            category: request.category,
            location: request.location,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            capacity: request.capacity,
            registration_deadline: request.registration_deadline,
            is_public: request.is_public,
            requires_approval: request.requires_approval,
            organizer_id: request.organizer_id,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<Event> {
        let mut tables = self.tables();
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SchoolDeskError::event_not_found(id))?;

        if let Some(title) = request.title {
            event.title = title;
        }
        if let Some(description) = request.description {
            event.description = Some(description);
        }
        if let Some(category) = request.category {
            event.category = category;
        }
        if let Some(location) = request.location {
            event.location = Some(location);
        }
        if let Some(date) = request.date {
            event.date = date;
        }
        if let Some(start_time) = request.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            event.end_time = end_time;
        }
        if let Some(capacity) = request.capacity {
            event.capacity = capacity;
        }
        if let Some(deadline) = request.registration_deadline {
            event.registration_deadline = deadline;
        }
        if let Some(is_public) = request.is_public {
            event.is_public = is_public;
        }
        if let Some(requires_approval) = request.requires_approval {
            event.requires_approval = requires_approval;
        }
        event.updated_at = Utc::now();

        Ok(event.clone())
    }

    async fn delete_event(&self, id: i64) -> Result<()> {
        let mut tables = self.tables();
        tables.events.retain(|e| e.id != id);
        tables.registrations.retain(|r| r.event_id != id);
        Ok(())
    }

    async fn get_registration(&self, id: i64) -> Result<Option<Registration>> {
        Ok(self.tables().registrations.iter().find(|r| r.id == id).cloned())
    }

    async fn find_registration(&self, event_id: i64, user_id: i64) -> Result<Option<Registration>> {
        Ok(self
            .tables()
            .registrations
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn list_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        Ok(self
            .tables()
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>> {
        Ok(self
            .tables()
            .registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_registration(
        &self,
        request: CreateRegistrationRequest,
        capacity: Option<i32>,
    ) -> Result<Registration> {
        let mut tables = self.tables();

        if tables
            .registrations
            .iter()
            .any(|r| r.event_id == request.event_id && r.user_id == request.user_id)
        {
            return Err(SchoolDeskError::DuplicateRegistration {
                event_id: request.event_id,
                user_id: request.user_id,
            });
        }

        if let Some(capacity) = capacity {
            let held = tables
                .registrations
                .iter()
                .filter(|r| r.event_id == request.event_id && r.status.consumes_capacity())
                .count();
            if held >= capacity.max(0) as usize {
                return Err(SchoolDeskError::CapacityExceeded {
                    event_id: request.event_id,
                    capacity,
                });
            }
        }

        let registration = Registration {
            id: tables.allocate_id(),
            event_id: request.event_id,
            user_id: request.user_id,
            status: request.status,
            created_at: Utc::now(),
        };
        tables.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn update_registration(&self, id: i64, status: RegistrationStatus) -> Result<Registration> {
        let mut tables = self.tables();
        let registration = tables
            .registrations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SchoolDeskError::registration_not_found(id))?;
        registration.status = status;
        Ok(registration.clone())
    }

    async fn delete_registration(&self, id: i64) -> Result<()> {
        self.tables().registrations.retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .tables()
            .attendance
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(records)
    }

    async fn create_attendance(&self, request: CreateAttendanceRequest) -> Result<AttendanceRecord> {
        let mut tables = self.tables();
        let record = AttendanceRecord {
            id: tables.allocate_id(),
            student_id: request.student_id,
            class_id: request.class_id,
            date: request.date,
            status: request.status,
            created_at: Utc::now(),
        };
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn update_attendance(&self, id: i64, status: AttendanceStatus) -> Result<AttendanceRecord> {
        let mut tables = self.tables();
        let record = tables
            .attendance
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SchoolDeskError::NotFound { entity: "Attendance record", id })?;
        record.status = status;
        Ok(record.clone())
    }

    async fn delete_attendance(&self, id: i64) -> Result<()> {
        let mut tables = self.tables();
        let before = tables.attendance.len();
        tables.attendance.retain(|r| r.id != id);
        if tables.attendance.len() == before {
            return Err(SchoolDeskError::NotFound { entity: "Attendance record", id });
        }
        Ok(())
    }
}

#[async_trait]
impl GradeStore for MemoryStore {
    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<Grade>> {
        let mut grades: Vec<Grade> = self
            .tables()
            .grades
            .iter()
            .filter(|grade| filter.matches(grade))
            .cloned()
            .collect();
        grades.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(grades)
    }

    async fn create_grade(&self, request: CreateGradeRequest) -> Result<Grade> {
        let mut tables = self.tables();
        let grade = Grade {
            id: tables.allocate_id(),
            student_id: request.student_id,
            subject: request.subject,
            term: request.term,
            score: request.score,
            letter_grade: request.letter_grade,
            remarks: request.remarks,
            created_at: Utc::now(),
        };
        tables.grades.push(grade.clone());
        Ok(grade)
    }

    async fn delete_grade(&self, id: i64) -> Result<()> {
        let mut tables = self.tables();
        let before = tables.grades.len();
        tables.grades.retain(|g| g.id != id);
        if tables.grades.len() == before {
            return Err(SchoolDeskError::NotFound { entity: "Grade", id });
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&request.email)) {
            return Err(SchoolDeskError::Validation(format!(
                "Email already in use: {}",
                request.email
            )));
        }
        let user = User {
            id: tables.allocate_id(),
            name: request.name,
            email: request.email,
            role: request.role,
            guardian_id: request.guardian_id,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn list_children(&self, guardian_id: i64) -> Result<Vec<User>> {
        Ok(self
            .tables()
            .users
            .iter()
            .filter(|u| u.guardian_id == Some(guardian_id) && u.role == Role::Student)
            .cloned()
            .collect())
    }
}
