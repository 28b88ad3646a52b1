//! Services module
//!
//! This module contains business logic services

pub mod aggregation;
pub mod auth;
pub mod events;
pub mod records;
pub mod registration;
pub mod reports;
pub mod user;

// Re-export commonly used services
pub use auth::{Actor, SessionService};
pub use events::EventService;
pub use records::RecordService;
pub use registration::{EventLocks, RegistrationService, StatusChange};
pub use reports::{ReportService, StudentReport, ClassAttendanceReport, Dashboard};
pub use user::UserService;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::store::{AttendanceStore, EventStore, GradeStore, UserStore};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub session_service: SessionService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub record_service: RecordService,
    pub report_service: ReportService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services sharing one backend
    pub fn new<S>(settings: &Settings, store: Arc<S>) -> Self
    where
        S: EventStore + AttendanceStore + GradeStore + UserStore + 'static,
    {
        let events: Arc<dyn EventStore> = store.clone();
        let attendance: Arc<dyn AttendanceStore> = store.clone();
        let grades: Arc<dyn GradeStore> = store.clone();
        let users: Arc<dyn UserStore> = store;

        // Event edits and registration changes must contend for the same locks.
        let locks = Arc::new(EventLocks::new());

        Self {
            session_service: SessionService::new(&settings.auth),
            user_service: UserService::new(users.clone()),
            event_service: EventService::new(events.clone(), locks.clone()),
            registration_service: RegistrationService::new(events.clone(), locks),
            record_service: RecordService::new(attendance.clone(), grades.clone()),
            report_service: ReportService::new(events, attendance, grades, users, settings.reporting.clone()),
        }
    }
}
