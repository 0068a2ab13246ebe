use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::models::event::{Event, EventStatus, STATUS_CANCELLED, STATUS_CONFIRMED};
use crate::domain::models::notification::{
    context_hash, NotificationLog, LOG_STATUS_FAILED, LOG_STATUS_SENT, TEMPLATE_EVENT_CANCELLED,
    TEMPLATE_EVENT_CONFIRMED,
};
use crate::domain::models::registration::Registration;
use crate::domain::ports::{
    EventRepository, NotificationDispatcher, NotificationLogRepository, OrganizerRepository,
    RegistrationRepository,
};
use crate::domain::services::locks::EventLocks;
use crate::domain::services::registration_queue::{has_enough_registrations, occupied_seats};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDecision {
    NoChange,
    Confirm,
    Cancel,
}

/// Decides whether an event's status must change. Pure with respect to
/// time: the caller supplies `now`.
///
/// Terminal states and a cleared automatic flag always yield `NoChange`.
/// An open event with too few registrations and no (or unexpired) deadline
/// stays undecided rather than being cancelled prematurely.
pub fn evaluate(
    event: &Event,
    registrations: &[Registration],
    now: DateTime<Utc>,
) -> Result<StatusDecision, AppError> {
    match event.parsed_status()? {
        EventStatus::Confirmed | EventStatus::Cancelled => return Ok(StatusDecision::NoChange),
        EventStatus::Planned => {}
    }
    if !event.automatic_status_change {
        return Ok(StatusDecision::NoChange);
    }
    if has_enough_registrations(event, registrations) {
        return Ok(StatusDecision::Confirm);
    }
    if let Some(deadline) = event.registration_deadline
        && now > deadline
    {
        return Ok(StatusDecision::Cancel);
    }
    Ok(StatusDecision::NoChange)
}

pub fn apply(event: &mut Event, decision: StatusDecision) {
    match decision {
        StatusDecision::NoChange => {}
        StatusDecision::Confirm => event.status = STATUS_CONFIRMED.to_string(),
        StatusDecision::Cancel => event.status = STATUS_CANCELLED.to_string(),
    }
}

/// Applies at most one automatic transition per invocation and sends the
/// status-specific notification. Used by the scheduler sweep and invoked
/// synchronously after a registration fills the event.
pub struct StatusChangeService {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    organizers: Arc<dyn OrganizerRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    notification_log: Arc<dyn NotificationLogRepository>,
    locks: Arc<EventLocks>,
}

impl StatusChangeService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        organizers: Arc<dyn OrganizerRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        notification_log: Arc<dyn NotificationLogRepository>,
        locks: Arc<EventLocks>,
    ) -> Self {
        Self {
            events,
            registrations,
            organizers,
            dispatcher,
            notification_log,
            locks,
        }
    }

    /// Evaluate and, when due, persist a status change for one event. A
    /// stale-version conflict aborts this event only; the next run
    /// re-evaluates it from fresh state.
    pub async fn process(&self, event_id: &str, now: DateTime<Utc>) -> Result<StatusDecision, AppError> {
        let lock = self.locks.for_event(event_id);
        let _guard = lock.lock().await;

        let event = self.events.find_by_id(event_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let registrations = self.registrations.list_active_by_event(event_id).await?;

        let decision = evaluate(&event, &registrations, now)?;
        if decision == StatusDecision::NoChange {
            return Ok(StatusDecision::NoChange);
        }

        let mut updated = event.clone();
        apply(&mut updated, decision);
        let persisted = self.events.update(&updated).await?;
        info!("Event {} moved {} -> {}", persisted.id, event.status, persisted.status);

        self.notify_status_change(&persisted, decision, &registrations).await;
        Ok(decision)
    }

    /// One dispatch per event (not per organizer), addressed to the
    /// primary organizer. The status change is already persisted; a
    /// dispatch failure is logged and never unwinds it.
    async fn notify_status_change(
        &self,
        event: &Event,
        decision: StatusDecision,
        registrations: &[Registration],
    ) {
        let template_key = match decision {
            StatusDecision::Confirm => TEMPLATE_EVENT_CONFIRMED,
            StatusDecision::Cancel => TEMPLATE_EVENT_CANCELLED,
            StatusDecision::NoChange => return,
        };

        let organizers = match self.organizers.list_by_event(&event.id).await {
            Ok(o) => o,
            Err(e) => {
                warn!("Could not load organizers for event {}: {}", event.id, e);
                return;
            }
        };
        let Some(primary) = organizers.first() else {
            warn!("Event {} has no organizers to notify about {}", event.id, template_key);
            return;
        };

        let hash = context_hash(template_key, &event.id, &primary.email);
        match self.notification_log.has_been_sent(&primary.email, template_key, &hash).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                warn!("Ledger lookup failed for {}: {}", primary.email, e);
                return;
            }
        }

        let params = json!({
            "event_id": event.id,
            "event_title": event.title,
            "occupied_seats": occupied_seats(event, registrations),
            "min_attendees": event.min_attendees,
            "max_attendees": event.max_attendees,
        });

        let status = match self.dispatcher.notify(event, &primary.email, template_key, &params).await {
            Ok(()) => LOG_STATUS_SENT,
            Err(e) => {
                warn!("Status notification for event {} failed: {}", event.id, e);
                LOG_STATUS_FAILED
            }
        };
        let entry = NotificationLog::new(&event.id, &primary.email, template_key, &hash, status);
        if let Err(e) = self.notification_log.log(&entry).await {
            warn!("Could not record status notification for event {}: {}", event.id, e);
        }
    }
}
