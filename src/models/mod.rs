//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod registration;
pub mod attendance;
pub mod grade;

// Re-export commonly used models
pub use user::{User, Role, CreateUserRequest};
pub use event::{Event, EventSummary, EventFilter, CreateEventRequest, UpdateEventRequest};
pub use registration::{Registration, RegistrationStatus, CreateRegistrationRequest};
pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceFilter, CreateAttendanceRequest};
pub use grade::{Grade, GradeFilter, CreateGradeRequest};
