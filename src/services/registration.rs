//! Event registration lifecycle
//!
//! ```text
//! NONE --register--> PENDING --approve--> APPROVED --mark--> ATTENDED
//!                       |                    |
//!                       +------reject--------+--> REJECTED
//! PENDING | APPROVED --cancel--> NONE (record deleted)
//! ```
//!
//! The legality rules are pure functions over an event snapshot. The
//! [`RegistrationService`] applies them while holding the event's lock so the
//! capacity check and the insert cannot interleave with another request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use crate::models::*;
use crate::store::EventStore;
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::logging::log_registration_transition;
use super::aggregation::registration_counts;
use super::auth::{can_edit, can_register, require, Actor};

/// Per-event async mutexes serializing every registration mutation
#[derive(Default)]
pub struct EventLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `event_id`
    pub async fn acquire(&self, event_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(event_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the mutex of a deleted event
    pub fn forget(&self, event_id: i64) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.remove(&event_id);
    }
}

/// Outcome of an organizer status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Changed { from: RegistrationStatus, to: RegistrationStatus },
    Unchanged,
}

/// Decide whether `actor` may register for `event` and in which state.
///
/// `active_registrations` is the event's current non-rejected count.
pub fn check_register(
    event: &Event,
    actor: &Actor,
    existing: Option<&Registration>,
    active_registrations: i64,
    now: DateTime<Utc>,
) -> Result<RegistrationStatus> {
    require(can_register(event, actor), actor, "register for this event")?;

    if !event.is_registration_open(now) {
        return Err(SchoolDeskError::DeadlinePassed { event_id: event.id });
    }

    if existing.is_some() {
        return Err(SchoolDeskError::DuplicateRegistration {
            event_id: event.id,
            user_id: actor.user_id,
        });
    }

    if let Some(capacity) = event.capacity {
        if event.is_full(active_registrations) {
            return Err(SchoolDeskError::CapacityExceeded { event_id: event.id, capacity });
        }
    }

    Ok(if event.requires_approval {
        RegistrationStatus::Pending
    } else {
        RegistrationStatus::Approved
    })
}

/// Only pending and approved registrations can be withdrawn by their owner
pub fn check_cancel(event_id: i64, user_id: i64, existing: Option<&Registration>) -> Result<&Registration> {
    let registration = existing.ok_or(SchoolDeskError::NotRegistered { event_id, user_id })?;
    if !registration.status.is_active() {
        return Err(SchoolDeskError::InvalidStateTransition {
            from: registration.status.to_string(),
            to: "NONE".to_string(),
        });
    }
    Ok(registration)
}

/// Decide an organizer's status update
pub fn check_status_update(
    event: &Event,
    registration: &Registration,
    new_status: RegistrationStatus,
    actor: &Actor,
) -> Result<StatusChange> {
    require(can_edit(event, actor), actor, "manage registrations for this event")?;

    if new_status == RegistrationStatus::Pending {
        return Err(SchoolDeskError::Validation(
            "Registrations cannot be moved back to PENDING".to_string(),
        ));
    }

    let current = registration.status;
    if current == new_status {
        return Ok(StatusChange::Unchanged);
    }
    if !current.can_transition_to(new_status) {
        return Err(SchoolDeskError::InvalidStateTransition {
            from: current.to_string(),
            to: new_status.to_string(),
        });
    }
    Ok(StatusChange::Changed { from: current, to: new_status })
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn EventStore>,
    locks: Arc<EventLocks>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn EventStore>, locks: Arc<EventLocks>) -> Self {
        Self { store, locks }
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| SchoolDeskError::event_not_found(event_id))
    }

    async fn load_registration(&self, registration_id: i64) -> Result<Registration> {
        self.store
            .get_registration(registration_id)
            .await?
            .ok_or_else(|| SchoolDeskError::registration_not_found(registration_id))
    }

    /// Seats currently held on `event_id`
    pub async fn registration_count(&self, event_id: i64) -> Result<i64> {
        let registrations = self.store.list_registrations(event_id).await?;
        Ok(registration_counts(&registrations).active() as i64)
    }

    pub async fn register(&self, event_id: i64, actor: &Actor) -> Result<Registration> {
        self.register_at(event_id, actor, Utc::now()).await
    }

    /// Register `actor` for `event_id` as of `now`
    pub async fn register_at(&self, event_id: i64, actor: &Actor, now: DateTime<Utc>) -> Result<Registration> {
        let _guard = self.locks.acquire(event_id).await;

        let event = self.load_event(event_id).await?;
        let existing = self.store.find_registration(event_id, actor.user_id).await?;
        let count = self.registration_count(event_id).await?;
        let status = check_register(&event, actor, existing.as_ref(), count, now)?;

        let registration = self
            .store
            .create_registration(
                CreateRegistrationRequest { event_id, user_id: actor.user_id, status },
                event.capacity,
            )
            .await?;

        log_registration_transition(event_id, actor.user_id, None, Some(status), actor.user_id);
        Ok(registration)
    }

    /// Withdraw the actor's own pending or approved registration
    pub async fn cancel(&self, event_id: i64, actor: &Actor) -> Result<()> {
        let _guard = self.locks.acquire(event_id).await;

        let existing = self.store.find_registration(event_id, actor.user_id).await?;
        let registration = check_cancel(event_id, actor.user_id, existing.as_ref())?;
        self.store.delete_registration(registration.id).await?;

        log_registration_transition(event_id, actor.user_id, Some(registration.status), None, actor.user_id);
        Ok(())
    }

    /// Approve, reject or mark attendance on a registration
    pub async fn update_status(
        &self,
        registration_id: i64,
        new_status: RegistrationStatus,
        actor: &Actor,
    ) -> Result<Registration> {
        let event_id = self.load_registration(registration_id).await?.event_id;
        let _guard = self.locks.acquire(event_id).await;

        // Re-read under the lock; the record may have moved meanwhile.
        let registration = self.load_registration(registration_id).await?;
        let event = self.load_event(registration.event_id).await?;

        match check_status_update(&event, &registration, new_status, actor)? {
            StatusChange::Unchanged => {
                debug!(registration_id = registration_id, status = %new_status, "Status already set");
                Ok(registration)
            }
            StatusChange::Changed { from, to } => {
                let updated = self.store.update_registration(registration_id, to).await?;
                log_registration_transition(event.id, registration.user_id, Some(from), Some(to), actor.user_id);
                Ok(updated)
            }
        }
    }

    /// Organizer hard delete, whatever the registration's state
    pub async fn delete_registration(&self, registration_id: i64, actor: &Actor) -> Result<()> {
        let event_id = self.load_registration(registration_id).await?.event_id;
        let _guard = self.locks.acquire(event_id).await;

        let registration = self.load_registration(registration_id).await?;
        let event = self.load_event(registration.event_id).await?;
        require(can_edit(&event, actor), actor, "delete registrations for this event")?;

        self.store.delete_registration(registration_id).await?;
        log_registration_transition(event.id, registration.user_id, Some(registration.status), None, actor.user_id);
        Ok(())
    }

    /// All registrations of an event, for its organizer
    pub async fn list_registrations(&self, event_id: i64, actor: &Actor) -> Result<Vec<Registration>> {
        let event = self.load_event(event_id).await?;
        require(can_edit(&event, actor), actor, "view registrations for this event")?;
        self.store.list_registrations(event_id).await
    }

    pub async fn my_registrations(&self, actor: &Actor) -> Result<Vec<Registration>> {
        self.store.list_user_registrations(actor.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn event(capacity: Option<i32>, requires_approval: bool) -> Event {
        Event {
            id: 1,
            title: "Field trip".to_string(),
            description: None,
            category: "trip".to_string(),
            location: None,
            date: NaiveDate::from_ymd_opt(2026, 11, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            capacity,
            registration_deadline: None,
            is_public: true,
            requires_approval,
            organizer_id: 100,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration(status: RegistrationStatus) -> Registration {
        Registration { id: 5, event_id: 1, user_id: 7, status, created_at: Utc::now() }
    }

    fn student() -> Actor {
        Actor::new(7, Role::Student)
    }

    fn organizer() -> Actor {
        Actor::new(100, Role::Teacher)
    }

    #[test]
    fn test_register_status_depends_on_approval() {
        let now = Utc::now();
        assert_eq!(check_register(&event(None, false), &student(), None, 0, now).unwrap(), RegistrationStatus::Approved);
        assert_eq!(check_register(&event(None, true), &student(), None, 0, now).unwrap(), RegistrationStatus::Pending);
    }

    #[test]
    fn test_register_preconditions() {
        let now = Utc::now();
        assert_matches!(
            check_register(&event(Some(2), false), &student(), None, 2, now),
            Err(SchoolDeskError::CapacityExceeded { capacity: 2, .. })
        );

        let existing = registration(RegistrationStatus::Rejected);
        assert_matches!(
            check_register(&event(None, false), &student(), Some(&existing), 0, now),
            Err(SchoolDeskError::DuplicateRegistration { user_id: 7, .. })
        );

        let mut late = event(None, false);
        late.registration_deadline = Some(now - Duration::minutes(1));
        assert_matches!(
            check_register(&late, &student(), None, 0, now),
            Err(SchoolDeskError::DeadlinePassed { event_id: 1 })
        );

        late.registration_deadline = Some(now);
        assert!(check_register(&late, &student(), None, 0, now).is_ok());

        let mut private = event(None, false);
        private.is_public = false;
        assert_matches!(check_register(&private, &student(), None, 0, now), Err(SchoolDeskError::Forbidden(_)));
    }

    #[test]
    fn test_cancel_requires_active_registration() {
        assert_matches!(check_cancel(1, 7, None), Err(SchoolDeskError::NotRegistered { event_id: 1, user_id: 7 }));
        assert!(check_cancel(1, 7, Some(&registration(RegistrationStatus::Pending))).is_ok());
        assert_matches!(
            check_cancel(1, 7, Some(&registration(RegistrationStatus::Attended))),
            Err(SchoolDeskError::InvalidStateTransition { .. })
        );
    }

    #[test]
    fn test_status_update_rules() {
        let event = event(None, true);
        assert_matches!(
            check_status_update(&event, &registration(RegistrationStatus::Pending), RegistrationStatus::Attended, &organizer()),
            Err(SchoolDeskError::InvalidStateTransition { from, to }) if from == "PENDING" && to == "ATTENDED"
        );
        assert_eq!(
            check_status_update(&event, &registration(RegistrationStatus::Pending), RegistrationStatus::Approved, &organizer()).unwrap(),
            StatusChange::Changed { from: RegistrationStatus::Pending, to: RegistrationStatus::Approved }
        );
        assert_eq!(
            check_status_update(&event, &registration(RegistrationStatus::Approved), RegistrationStatus::Approved, &organizer()).unwrap(),
            StatusChange::Unchanged
        );
        assert_matches!(
            check_status_update(&event, &registration(RegistrationStatus::Approved), RegistrationStatus::Pending, &organizer()),
            Err(SchoolDeskError::Validation(_))
        );
        assert_matches!(
            check_status_update(&event, &registration(RegistrationStatus::Pending), RegistrationStatus::Approved, &student()),
            Err(SchoolDeskError::Forbidden(_))
        );
        assert!(check_status_update(
            &event,
            &registration(RegistrationStatus::Pending),
            RegistrationStatus::Rejected,
            &Actor::new(1, Role::Admin)
        )
        .is_ok());
    }

    #[tokio::test]
    async fn test_locks_are_per_event() {
        let locks = EventLocks::new();
        let first = locks.acquire(1).await;
        // A different event is not blocked by the held guard.
        let _other = locks.acquire(2).await;
        drop(first);
        let _again = locks.acquire(1).await;
        locks.forget(2);
    }
}
