//! Event model

use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use super::registration::RegistrationStatus;
use crate::utils::helpers::matches_query;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub requires_approval: bool,
    pub organizer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether registrations are still accepted at `now`
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        self.registration_deadline.map_or(true, |deadline| now <= deadline)
    }

    /// Whether `active_registrations` already fills the event
    pub fn is_full(&self, active_registrations: i64) -> bool {
        self.capacity.map_or(false, |capacity| active_registrations >= i64::from(capacity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub requires_approval: bool,
    /// Filled in from the acting user; ignored on input
    #[serde(default)]
    pub organizer_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// `Some(None)` removes the limit
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Option<i32>>,
    /// `Some(None)` removes the deadline
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<Option<DateTime<Utc>>>,
    pub is_public: Option<bool>,
    pub requires_approval: Option<bool>,
}

/// Absent field: `None`. Explicit `null`: `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An event as displayed to one viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub event: Event,
    /// Authoritative capacity counter: non-rejected registrations
    pub registrations: i64,
    pub remaining: Option<i64>,
    pub viewer_status: Option<RegistrationStatus>,
}

/// Client-side event filtering and search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub category: Option<String>,
    pub query: Option<String>,
    /// Only events on or after this date
    pub upcoming_from: Option<NaiveDate>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = &self.category {
            if !event.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(from) = self.upcoming_from {
            if event.date < from {
                return false;
            }
        }
        match &self.query {
            Some(query) => matches_query(
                query,
                [
                    Some(event.title.as_str()),
                    event.description.as_deref(),
                    event.location.as_deref(),
                ],
            ),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let untouched: UpdateEventRequest = serde_json::from_str(r#"{"title": "Open day"}"#).unwrap();
        assert_eq!(untouched.capacity, None);
        assert_eq!(untouched.registration_deadline, None);

        let cleared: UpdateEventRequest =
            serde_json::from_str(r#"{"capacity": null, "registration_deadline": null}"#).unwrap();
        assert_eq!(cleared.capacity, Some(None));
        assert_eq!(cleared.registration_deadline, Some(None));

        let set: UpdateEventRequest = serde_json::from_str(r#"{"capacity": 25}"#).unwrap();
        assert_eq!(set.capacity, Some(Some(25)));
    }

    #[test]
    fn test_update_serializes_cleared_fields_as_null() {
        let request = UpdateEventRequest { capacity: Some(None), ..Default::default() };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["capacity"].is_null());
        assert!(json.get("registration_deadline").is_none());
    }
}
