//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod registration;
pub mod attendance;
pub mod grade;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use attendance::AttendanceRepository;
pub use grade::GradeRepository;
