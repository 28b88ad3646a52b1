//! Event management service
//!
//! Organizers (teachers and admins) create, edit and delete events; everyone
//! browses the events visible to them, each annotated with its live
//! registration count.

use std::sync::Arc;
use chrono::{TimeZone, Utc};
use tracing::info;
use crate::models::*;
use crate::store::EventStore;
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::helpers::{normalize_whitespace, truncate_text};
use crate::utils::logging::log_event_action;
use super::aggregation::registration_counts;
use super::auth::{can_create_events, can_edit, can_view_event, require, Actor};
use super::registration::EventLocks;

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    locks: Arc<EventLocks>,
}

/// Field rules shared by create and update
fn validate_event_fields(
    title: &str,
    category: &str,
    start: chrono::NaiveTime,
    end: chrono::NaiveTime,
    date: chrono::NaiveDate,
    capacity: Option<i32>,
    deadline: Option<chrono::DateTime<Utc>>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(SchoolDeskError::Validation("Event title is required".to_string()));
    }
    if category.trim().is_empty() {
        return Err(SchoolDeskError::Validation("Event category is required".to_string()));
    }
    if end <= start {
        return Err(SchoolDeskError::Validation("Event must end after it starts".to_string()));
    }
    if let Some(capacity) = capacity {
        if capacity < 1 {
            return Err(SchoolDeskError::Validation(format!(
                "Capacity must be at least 1, got {}",
                capacity
            )));
        }
    }
    if let Some(deadline) = deadline {
        let ends_at = Utc.from_utc_datetime(&date.and_time(end));
        if deadline > ends_at {
            return Err(SchoolDeskError::Validation(
                "Registration deadline cannot be after the event ends".to_string(),
            ));
        }
    }
    Ok(())
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, locks: Arc<EventLocks>) -> Self {
        Self { store, locks }
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| SchoolDeskError::event_not_found(event_id))
    }

    pub async fn create_event(&self, actor: &Actor, mut request: CreateEventRequest) -> Result<Event> {
        require(can_create_events(actor), actor, "create events")?;

        request.title = normalize_whitespace(&request.title);
        validate_event_fields(
            &request.title,
            &request.category,
            request.start_time,
            request.end_time,
            request.date,
            request.capacity,
            request.registration_deadline,
        )?;
        request.organizer_id = actor.user_id;

        let event = self.store.create_event(request).await?;
        log_event_action(event.id, "create", actor.user_id, Some(&truncate_text(&event.title, 64)));
        Ok(event)
    }

    pub async fn update_event(&self, actor: &Actor, event_id: i64, mut request: UpdateEventRequest) -> Result<Event> {
        let _guard = self.locks.acquire(event_id).await;

        let event = self.load_event(event_id).await?;
        require(can_edit(&event, actor), actor, "edit this event")?;

        if let Some(title) = request.title.as_mut() {
            *title = normalize_whitespace(title);
        }
        validate_event_fields(
            request.title.as_deref().unwrap_or(&event.title),
            request.category.as_deref().unwrap_or(&event.category),
            request.start_time.unwrap_or(event.start_time),
            request.end_time.unwrap_or(event.end_time),
            request.date.unwrap_or(event.date),
            request.capacity.unwrap_or(event.capacity),
            request.registration_deadline.unwrap_or(event.registration_deadline),
        )?;

        if let Some(Some(capacity)) = request.capacity {
            let registrations = self.store.list_registrations(event_id).await?;
            let held = registration_counts(&registrations).active() as i64;
            if i64::from(capacity) < held {
                return Err(SchoolDeskError::Validation(format!(
                    "Capacity {} is below the {} registrations already held",
                    capacity, held
                )));
            }
        }

        let updated = self.store.update_event(event_id, request).await?;
        log_event_action(event_id, "update", actor.user_id, None);
        Ok(updated)
    }

    pub async fn delete_event(&self, actor: &Actor, event_id: i64) -> Result<()> {
        {
            let _guard = self.locks.acquire(event_id).await;
            let event = self.load_event(event_id).await?;
            require(can_edit(&event, actor), actor, "delete this event")?;
            self.store.delete_event(event_id).await?;
        }
        self.locks.forget(event_id);

        log_event_action(event_id, "delete", actor.user_id, None);
        Ok(())
    }

    async fn summarize(&self, event: Event, actor: &Actor) -> Result<EventSummary> {
        let registrations = self.store.list_registrations(event.id).await?;
        let held = registration_counts(&registrations).active() as i64;
        let viewer_status = registrations
            .iter()
            .find(|r| r.user_id == actor.user_id)
            .map(|r| r.status);

        Ok(EventSummary {
            remaining: event.capacity.map(|capacity| (i64::from(capacity) - held).max(0)),
            registrations: held,
            viewer_status,
            event,
        })
    }

    /// One event with its registration count, as `actor` sees it
    pub async fn event_summary(&self, actor: &Actor, event_id: i64) -> Result<EventSummary> {
        let event = self.load_event(event_id).await?;
        require(can_view_event(&event, actor), actor, "view this event")?;
        self.summarize(event, actor).await
    }

    /// Visible events matching `filter`, ordered by date
    pub async fn list_events(&self, actor: &Actor, filter: &EventFilter) -> Result<Vec<EventSummary>> {
        let events: Vec<Event> = self
            .store
            .list_events()
            .await?
            .into_iter()
            .filter(|event| can_view_event(event, actor) && filter.matches(event))
            .collect();

        info!(user_id = actor.user_id, count = events.len(), "Listing events");

        let mut summaries = Vec::with_capacity(events.len());
        for event in events {
            summaries.push(self.summarize(event, actor).await?);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};

    #[test]
    fn test_validate_event_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        assert!(validate_event_fields("Concert", "music", nine, ten, date, Some(30), None).is_ok());
        assert!(validate_event_fields("  ", "music", nine, ten, date, None, None).is_err());
        assert!(validate_event_fields("Concert", "music", ten, nine, date, None, None).is_err());
        assert!(validate_event_fields("Concert", "music", nine, ten, date, Some(0), None).is_err());

        let ends_at = Utc.from_utc_datetime(&date.and_time(ten));
        assert!(validate_event_fields("Concert", "music", nine, ten, date, None, Some(ends_at)).is_ok());
        assert!(validate_event_fields("Concert", "music", nine, ten, date, None, Some(ends_at + Duration::minutes(1))).is_err());
    }
}
