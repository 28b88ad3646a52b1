//! Database service layer
//!
//! Binds the Postgres repositories to the store traits used by the services.

use async_trait::async_trait;
use crate::database::{DatabasePool, UserRepository, EventRepository, RegistrationRepository, AttendanceRepository, GradeRepository};
use crate::models::*;
use crate::store::{EventStore, AttendanceStore, GradeStore, UserStore};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub attendance: AttendanceRepository,
    pub grades: GradeRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            grades: GradeRepository::new(pool),
        }
    }
}

#[async_trait]
impl EventStore for DatabaseService {
    async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.events.list().await
    }

    async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        self.events.create(request).await
    }

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<Event> {
        self.events.update(id, request).await
    }

    async fn delete_event(&self, id: i64) -> Result<()> {
        // registrations go with the event through ON DELETE CASCADE
        self.events.delete(id).await
    }

    async fn get_registration(&self, id: i64) -> Result<Option<Registration>> {
        self.registrations.find_by_id(id).await
    }

    async fn find_registration(&self, event_id: i64, user_id: i64) -> Result<Option<Registration>> {
        self.registrations.find(event_id, user_id).await
    }

    async fn list_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.registrations.list_for_event(event_id).await
    }

    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>> {
        self.registrations.list_for_user(user_id).await
    }

    async fn create_registration(
        &self,
        request: CreateRegistrationRequest,
        capacity: Option<i32>,
    ) -> Result<Registration> {
        self.registrations.create_checked(request, capacity).await
    }

    async fn update_registration(&self, id: i64, status: RegistrationStatus) -> Result<Registration> {
        self.registrations.update_status(id, status).await
    }

    async fn delete_registration(&self, id: i64) -> Result<()> {
        self.registrations.delete(id).await
    }
}

#[async_trait]
impl AttendanceStore for DatabaseService {
    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        self.attendance.list(filter).await
    }

    async fn create_attendance(&self, request: CreateAttendanceRequest) -> Result<AttendanceRecord> {
        self.attendance.create(request).await
    }

    async fn update_attendance(&self, id: i64, status: AttendanceStatus) -> Result<AttendanceRecord> {
        self.attendance.update_status(id, status).await
    }

    async fn delete_attendance(&self, id: i64) -> Result<()> {
        self.attendance.delete(id).await
    }
}

#[async_trait]
impl GradeStore for DatabaseService {
    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<Grade>> {
        self.grades.list(filter).await
    }

    async fn create_grade(&self, request: CreateGradeRequest) -> Result<Grade> {
        self.grades.create(request).await
    }

    async fn delete_grade(&self, id: i64) -> Result<()> {
        self.grades.delete(id).await
    }
}

#[async_trait]
impl UserStore for DatabaseService {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        self.users.create(request).await
    }

    async fn list_children(&self, guardian_id: i64) -> Result<Vec<User>> {
        self.users.list_children(guardian_id).await
    }
}
