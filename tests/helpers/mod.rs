//! Test helpers
//!
//! Shared fixtures for the integration tests: an in-memory backed service
//! stack with seeded users, and request builders.

#![allow(dead_code)]

pub mod database_helper;

use std::sync::{Arc, Once};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use SchoolDesk::config::Settings;
use SchoolDesk::models::*;
use SchoolDesk::services::{Actor, ServiceFactory};
use SchoolDesk::store::{MemoryStore, UserStore};

static INIT: Once = Once::new();

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";

/// Initialize test logging once per binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_SECRET.to_string();
    settings
}

/// Service stack over a fresh memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub services: ServiceFactory,
    pub admin: Actor,
    pub teacher: Actor,
}

impl TestContext {
    pub async fn new() -> Self {
        init_test_logging();
        let store = Arc::new(MemoryStore::new());
        let services = ServiceFactory::new(&test_settings(), store.clone());

        let admin = Self::seed(&store, "Ada Admin", "admin@school.test", Role::Admin, None).await;
        let teacher = Self::seed(&store, "Tom Teacher", "teacher@school.test", Role::Teacher, None).await;

        Self {
            store,
            services,
            admin: Actor::from(&admin),
            teacher: Actor::from(&teacher),
        }
    }

    async fn seed(store: &MemoryStore, name: &str, email: &str, role: Role, guardian_id: Option<i64>) -> User {
        store
            .create_user(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                role,
                guardian_id,
            })
            .await
            .expect("Failed to seed user")
    }

    pub async fn student(&self, name: &str) -> Actor {
        let email = format!("{}@school.test", name.to_lowercase().replace(' ', "."));
        Actor::from(&Self::seed(&self.store, name, &email, Role::Student, None).await)
    }

    pub async fn parent(&self, name: &str) -> Actor {
        let email = format!("{}@school.test", name.to_lowercase().replace(' ', "."));
        Actor::from(&Self::seed(&self.store, name, &email, Role::Parent, None).await)
    }

    pub async fn child_of(&self, parent: &Actor, name: &str) -> Actor {
        let email = format!("{}@school.test", name.to_lowercase().replace(' ', "."));
        Actor::from(&Self::seed(&self.store, name, &email, Role::Student, Some(parent.user_id)).await)
    }

    /// Event created by the seeded teacher
    pub async fn event(&self, request: CreateEventRequest) -> Event {
        self.services
            .event_service
            .create_event(&self.teacher, request)
            .await
            .expect("Failed to create event")
    }
}

pub fn event_date() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

/// A public event a month from now, without approval
pub fn event_request(title: &str, capacity: Option<i32>) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: Some(format!("{} for the whole school", title)),
        category: "activity".to_string(),
        location: Some("Main hall".to_string()),
        date: event_date(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        capacity,
        registration_deadline: None,
        is_public: true,
        requires_approval: false,
        organizer_id: 0,
    }
}

pub fn grade_request(student_id: i64, subject: &str, term: &str, score: f64, letter: &str) -> CreateGradeRequest {
    CreateGradeRequest {
        student_id,
        subject: subject.to_string(),
        term: term.to_string(),
        score,
        letter_grade: letter.to_string(),
        remarks: None,
    }
}
