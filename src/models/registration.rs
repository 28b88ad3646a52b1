//! Event registration model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Where a registration sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Attended,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
            RegistrationStatus::Attended => "ATTENDED",
        }
    }

    /// Pending and approved registrations can still be cancelled by their owner
    pub fn is_active(&self) -> bool {
        matches!(self, RegistrationStatus::Pending | RegistrationStatus::Approved)
    }

    /// Everything except a rejection holds a seat
    pub fn consumes_capacity(&self) -> bool {
        !matches!(self, RegistrationStatus::Rejected)
    }

    /// Organizer-driven transitions. Re-applying the current status is allowed.
    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Rejected) | (Approved, Attended)
        )
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = crate::utils::errors::SchoolDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "APPROVED" => Ok(RegistrationStatus::Approved),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            "ATTENDED" => Ok(RegistrationStatus::Attended),
            other => Err(crate::utils::errors::SchoolDeskError::Validation(
                format!("Unknown registration status: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::RegistrationStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Attended));
        assert!(Approved.can_transition_to(Rejected));

        assert!(!Pending.can_transition_to(Attended));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Attended.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
    }

    #[test]
    fn test_same_status_is_allowed() {
        for status in [Pending, Approved, Rejected, Attended] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_capacity_and_activity() {
        assert!(Pending.consumes_capacity());
        assert!(Attended.consumes_capacity());
        assert!(!Rejected.consumes_capacity());
        assert!(Approved.is_active());
        assert!(!Attended.is_active());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("approved".parse::<RegistrationStatus>().unwrap(), Approved);
        assert_eq!(Attended.to_string(), "ATTENDED");
        assert!("cancelled".parse::<RegistrationStatus>().is_err());
        assert_eq!(serde_json::to_string(&Pending).unwrap(), "\"PENDING\"");
    }
}
