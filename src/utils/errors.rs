//! Error handling for SchoolDesk
//!
//! This module defines the main error type used throughout the application.
//! Registration rule violations are typed variants so callers can map them
//! to user-facing messages; infrastructure failures wrap their source errors.

use thiserror::Error;

/// Main error type for SchoolDesk
#[derive(Error, Debug)]
pub enum SchoolDeskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event {event_id} is full (capacity {capacity})")]
    CapacityExceeded { event_id: i64, capacity: i32 },

    #[error("Registration deadline for event {event_id} has passed")]
    DeadlinePassed { event_id: i64 },

    #[error("User {user_id} is already registered for event {event_id}")]
    DuplicateRegistration { event_id: i64, user_id: i64 },

    #[error("User {user_id} is not registered for event {event_id}")]
    NotRegistered { event_id: i64, user_id: i64 },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SchoolDesk operations
pub type Result<T> = std::result::Result<T, SchoolDeskError>;

impl SchoolDeskError {
    pub fn event_not_found(id: i64) -> Self {
        SchoolDeskError::NotFound { entity: "Event", id }
    }

    pub fn registration_not_found(id: i64) -> Self {
        SchoolDeskError::NotFound { entity: "Registration", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        SchoolDeskError::NotFound { entity: "User", id }
    }

    /// Check if the error is recoverable
    ///
    /// Rule violations are final for the request that caused them; only
    /// infrastructure hiccups are worth retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SchoolDeskError::Validation(_) => false,
            SchoolDeskError::CapacityExceeded { .. } => false,
            SchoolDeskError::DeadlinePassed { .. } => false,
            SchoolDeskError::DuplicateRegistration { .. } => false,
            SchoolDeskError::NotRegistered { .. } => false,
            SchoolDeskError::Forbidden(_) => false,
            SchoolDeskError::NotFound { .. } => false,
            SchoolDeskError::InvalidStateTransition { .. } => false,
            SchoolDeskError::Authentication(_) => false,
            SchoolDeskError::Config(_) => false,
            SchoolDeskError::Database(_) => true,
            SchoolDeskError::Migration(_) => false,
            SchoolDeskError::Serialization(_) => false,
            SchoolDeskError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SchoolDeskError::Database(_) => ErrorSeverity::Critical,
            SchoolDeskError::Migration(_) => ErrorSeverity::Critical,
            SchoolDeskError::Config(_) => ErrorSeverity::Critical,
            SchoolDeskError::Forbidden(_) => ErrorSeverity::Warning,
            SchoolDeskError::Authentication(_) => ErrorSeverity::Warning,
            SchoolDeskError::Validation(_)
            | SchoolDeskError::CapacityExceeded { .. }
            | SchoolDeskError::DeadlinePassed { .. }
            | SchoolDeskError::DuplicateRegistration { .. }
            | SchoolDeskError::NotRegistered { .. }
            | SchoolDeskError::NotFound { .. }
            | SchoolDeskError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            SchoolDeskError::Validation(_) => "validation_error",
            SchoolDeskError::CapacityExceeded { .. } => "capacity_exceeded",
            SchoolDeskError::DeadlinePassed { .. } => "deadline_passed",
            SchoolDeskError::DuplicateRegistration { .. } => "duplicate_registration",
            SchoolDeskError::NotRegistered { .. } => "not_registered",
            SchoolDeskError::Forbidden(_) => "forbidden",
            SchoolDeskError::NotFound { .. } => "not_found",
            SchoolDeskError::InvalidStateTransition { .. } => "invalid_state_transition",
            SchoolDeskError::Authentication(_) => "authentication_error",
            SchoolDeskError::Config(_) => "config_error",
            SchoolDeskError::Database(_) => "database_error",
            SchoolDeskError::Migration(_) => "migration_error",
            SchoolDeskError::Serialization(_) => "serialization_error",
            SchoolDeskError::Io(_) => "io_error",
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violations_are_not_recoverable() {
        let err = SchoolDeskError::CapacityExceeded { event_id: 1, capacity: 2 };
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Info);
        assert_eq!(err.code(), "capacity_exceeded");
        assert_eq!(err.to_string(), "Event 1 is full (capacity 2)");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(SchoolDeskError::event_not_found(7).to_string(), "Event not found: 7");
        assert_eq!(SchoolDeskError::Forbidden("nope".into()).severity(), ErrorSeverity::Warning);
    }
}
