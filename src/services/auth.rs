//! Authentication and authorization
//!
//! Every permission decision in the crate goes through the capability checks
//! in this module, so role handling lives in one place. [`SessionService`]
//! turns signed session tokens into an [`Actor`].

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::AuthConfig;
use crate::models::{Event, Role, User};
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::logging::log_access_denied;

/// The authenticated user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Admins edit everything; everyone else only the events they organize
pub fn can_edit(event: &Event, actor: &Actor) -> bool {
    actor.is_admin() || event.organizer_id == actor.user_id
}

/// Private events are visible to staff and to their organizer
pub fn can_view_event(event: &Event, actor: &Actor) -> bool {
    event.is_public || actor.role.is_staff() || can_edit(event, actor)
}

/// Registration follows visibility
pub fn can_register(event: &Event, actor: &Actor) -> bool {
    can_view_event(event, actor)
}

pub fn can_create_events(actor: &Actor) -> bool {
    actor.role.is_staff()
}

/// Teachers record attendance and grades; corrections are admin-only
pub fn can_record_marks(actor: &Actor) -> bool {
    actor.role.is_staff()
}

pub fn can_correct_marks(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Staff see every student, students themselves, parents their children
pub fn can_view_student(actor: &Actor, student: &User) -> bool {
    match actor.role {
        Role::Admin | Role::Teacher => true,
        Role::Student => actor.user_id == student.id,
        Role::Parent => student.guardian_id == Some(actor.user_id),
    }
}

/// Turn a failed check into a logged `Forbidden` error
pub fn require(allowed: bool, actor: &Actor, action: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        log_access_denied(actor.user_id, action, actor.role.as_str());
        Err(SchoolDeskError::Forbidden(format!(
            "{} may not {}",
            actor.role.as_str().to_lowercase(),
            action
        )))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
}

impl SessionService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_seconds: config.token_ttl_seconds,
        }
    }

    /// Sign a token for `actor`
    pub fn issue(&self, actor: &Actor) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: actor.user_id.to_string(),
            role: actor.role,
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SchoolDeskError::Authentication(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the authenticated actor
    pub fn authenticate(&self, token: &str) -> Result<Actor> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| SchoolDeskError::Authentication(format!("Invalid session token: {}", e)))?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| SchoolDeskError::Authentication("Malformed subject claim".to_string()))?;

        debug!(user_id = user_id, role = %data.claims.role, "Session authenticated");
        Ok(Actor::new(user_id, data.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveTime};

    fn event(organizer_id: i64, is_public: bool) -> Event {
        Event {
            id: 1,
            title: "Debate night".to_string(),
            description: None,
            category: "club".to_string(),
            location: None,
            date: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            capacity: None,
            registration_deadline: None,
            is_public,
            requires_approval: false,
            organizer_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn student(id: i64, guardian_id: Option<i64>) -> User {
        User {
            id,
            name: "Sam".to_string(),
            email: format!("sam{}@school.test", id),
            role: Role::Student,
            guardian_id,
            created_at: Utc::now(),
        }
    }

    fn session() -> SessionService {
        SessionService::new(&AuthConfig {
            jwt_secret: "test-secret-of-sufficient-length".to_string(),
            token_ttl_seconds: 60,
        })
    }

    #[test]
    fn test_can_edit() {
        let event = event(7, true);
        assert!(can_edit(&event, &Actor::new(7, Role::Teacher)));
        assert!(can_edit(&event, &Actor::new(1, Role::Admin)));
        assert!(!can_edit(&event, &Actor::new(8, Role::Teacher)));
        assert!(!can_edit(&event, &Actor::new(9, Role::Student)));
    }

    #[test]
    fn test_private_events() {
        let event = event(7, false);
        assert!(can_register(&event, &Actor::new(8, Role::Teacher)));
        assert!(!can_register(&event, &Actor::new(9, Role::Student)));
        assert!(!can_view_event(&event, &Actor::new(10, Role::Parent)));
    }

    #[test]
    fn test_can_view_student() {
        let kid = student(20, Some(30));
        assert!(can_view_student(&Actor::new(30, Role::Parent), &kid));
        assert!(!can_view_student(&Actor::new(31, Role::Parent), &kid));
        assert!(can_view_student(&Actor::new(20, Role::Student), &kid));
        assert!(!can_view_student(&Actor::new(21, Role::Student), &kid));
        assert!(can_view_student(&Actor::new(2, Role::Teacher), &kid));
    }

    #[test]
    fn test_require() {
        let actor = Actor::new(9, Role::Student);
        assert!(require(true, &actor, "view").is_ok());
        assert_matches!(require(false, &actor, "create events"), Err(SchoolDeskError::Forbidden(msg)) if msg == "student may not create events");
    }

    #[test]
    fn test_session_round_trip() {
        let session = session();
        let actor = Actor::new(42, Role::Parent);
        let token = session.issue(&actor).unwrap();
        assert_eq!(session.authenticate(&token).unwrap(), actor);
    }

    #[test]
    fn test_session_rejects_foreign_signature() {
        let other = SessionService::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret".to_string(),
            token_ttl_seconds: 60,
        });
        let token = other.issue(&Actor::new(1, Role::Admin)).unwrap();
        assert_matches!(session().authenticate(&token), Err(SchoolDeskError::Authentication(_)));
        assert_matches!(session().authenticate("garbage"), Err(SchoolDeskError::Authentication(_)));
    }
}
