//! Persistence contracts
//!
//! The services only talk to storage through these traits. Two backends
//! implement them: [`MemoryStore`] and the Postgres-backed
//! [`DatabaseService`](crate::database::DatabaseService).

pub mod memory;

use async_trait::async_trait;
use crate::models::*;
use crate::utils::errors::Result;

pub use memory::MemoryStore;

/// Events and their registrations
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, id: i64) -> Result<Option<Event>>;

    /// All events ordered by date, then start time
    async fn list_events(&self) -> Result<Vec<Event>>;

    async fn create_event(&self, request: CreateEventRequest) -> Result<Event>;

    async fn update_event(&self, id: i64, request: UpdateEventRequest) -> Result<Event>;

    /// Removes the event together with its registrations
    async fn delete_event(&self, id: i64) -> Result<()>;

    async fn get_registration(&self, id: i64) -> Result<Option<Registration>>;

    async fn find_registration(&self, event_id: i64, user_id: i64) -> Result<Option<Registration>>;

    /// Registrations of one event in creation order
    async fn list_registrations(&self, event_id: i64) -> Result<Vec<Registration>>;

    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>>;

    /// Insert a registration.
    ///
    /// Implementations must re-check, atomically with the insert, that the
    /// (event, user) pair is unused and that fewer than `capacity` seats are
    /// held, failing with `DuplicateRegistration` / `CapacityExceeded`.
    async fn create_registration(
        &self,
        request: CreateRegistrationRequest,
        capacity: Option<i32>,
    ) -> Result<Registration>;

    async fn update_registration(&self, id: i64, status: RegistrationStatus) -> Result<Registration>;

    async fn delete_registration(&self, id: i64) -> Result<()>;
}

/// Attendance records, newest first
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>>;

    async fn create_attendance(&self, request: CreateAttendanceRequest) -> Result<AttendanceRecord>;

    async fn update_attendance(&self, id: i64, status: AttendanceStatus) -> Result<AttendanceRecord>;

    async fn delete_attendance(&self, id: i64) -> Result<()>;
}

/// Grades, newest first
#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn list_grades(&self, filter: &GradeFilter) -> Result<Vec<Grade>>;

    async fn create_grade(&self, request: CreateGradeRequest) -> Result<Grade>;

    async fn delete_grade(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    async fn create_user(&self, request: CreateUserRequest) -> Result<User>;

    /// Students whose guardian is `guardian_id`
    async fn list_children(&self, guardian_id: i64) -> Result<Vec<User>>;
}
