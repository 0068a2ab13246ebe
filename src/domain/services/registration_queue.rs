use std::sync::Arc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::models::event::{Event, EventStatus};
use crate::domain::models::notification::{
    context_hash, NotificationLog, LOG_STATUS_FAILED, LOG_STATUS_SENT,
    TEMPLATE_MINIMUM_REACHED, TEMPLATE_WAITLIST_PROMOTED,
};
use crate::domain::models::registration::{
    NewRegistrationParams, Registration, QUEUE_NONBINDING_RESERVATION, QUEUE_REGULAR,
    QUEUE_WAITING_LIST,
};
use crate::domain::ports::{
    EventRepository, NotificationDispatcher, NotificationLogRepository, OrganizerRepository,
    RegistrationRepository,
};
use crate::domain::services::locks::EventLocks;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Regular,
    WaitingList,
    Rejected,
}

/// Seats counted against the hard capacity: regular non-removed
/// registrations plus manually recorded offline attendees. Waiting-list
/// entries and nonbinding reservations never count. Registrations with a
/// corrupt seat count are skipped rather than crashing the batch.
pub fn occupied_seats(event: &Event, registrations: &[Registration]) -> i32 {
    let mut seats = event.offline_attendees;
    for reg in registrations {
        if reg.removed || !reg.is_regular() {
            continue;
        }
        if reg.seats < 1 {
            warn!("Skipping registration {} with invalid seat count {}", reg.id, reg.seats);
            continue;
        }
        seats += reg.seats;
    }
    seats
}

/// `None` means unlimited capacity (`max_attendees` = 0).
pub fn vacancies(event: &Event, registrations: &[Registration]) -> Option<i32> {
    if event.max_attendees > 0 {
        Some(event.max_attendees - occupied_seats(event, registrations))
    } else {
        None
    }
}

pub fn has_enough_registrations(event: &Event, registrations: &[Registration]) -> bool {
    occupied_seats(event, registrations) >= event.min_attendees
}

/// Pure admission decision. The caller persists the registration with the
/// queue status this returns.
pub fn can_accept_registration(
    event: &Event,
    registrations: &[Registration],
    requested_seats: i32,
) -> Result<AdmissionDecision, AppError> {
    if event.parsed_status()? == EventStatus::Cancelled {
        return Ok(AdmissionDecision::Rejected);
    }
    match vacancies(event, registrations) {
        None => Ok(AdmissionDecision::Regular),
        Some(v) if v >= requested_seats => Ok(AdmissionDecision::Regular),
        Some(_) if event.has_waiting_list() => Ok(AdmissionDecision::WaitingList),
        Some(_) => Ok(AdmissionDecision::Rejected),
    }
}

/// Derived queue figures for the availability endpoint.
#[derive(Debug, Serialize)]
pub struct QueueSnapshot {
    pub occupied_seats: i32,
    pub vacancies: Option<i32>,
    pub has_enough_registrations: bool,
    pub waiting_list_size: usize,
}

pub fn queue_snapshot(event: &Event, registrations: &[Registration]) -> QueueSnapshot {
    QueueSnapshot {
        occupied_seats: occupied_seats(event, registrations),
        vacancies: vacancies(event, registrations),
        has_enough_registrations: has_enough_registrations(event, registrations),
        waiting_list_size: registrations.iter().filter(|r| !r.removed && r.is_waiting()).count(),
    }
}

pub struct NewRegistrationRequest {
    pub attendee_name: String,
    pub attendee_email: String,
    pub seats: i32,
    pub nonbinding: bool,
}

pub struct RegistrationQueueManager {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    organizers: Arc<dyn OrganizerRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    notification_log: Arc<dyn NotificationLogRepository>,
    locks: Arc<EventLocks>,
    auto_promotion: bool,
}

impl RegistrationQueueManager {
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        organizers: Arc<dyn OrganizerRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        notification_log: Arc<dyn NotificationLogRepository>,
        locks: Arc<EventLocks>,
        auto_promotion: bool,
    ) -> Self {
        Self {
            events,
            registrations,
            organizers,
            dispatcher,
            notification_log,
            locks,
            auto_promotion,
        }
    }

    pub async fn register(
        &self,
        event_id: &str,
        request: NewRegistrationRequest,
    ) -> Result<Registration, AppError> {
        if request.seats < 1 {
            return Err(AppError::Validation("A registration must occupy at least one seat".into()));
        }

        let lock = self.locks.for_event(event_id);
        let _guard = lock.lock().await;

        let event = self.events.find_by_id(event_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let active = self.registrations.list_active_by_event(event_id).await?;

        let queue_status = if request.nonbinding {
            if event.parsed_status()? == EventStatus::Cancelled {
                return Err(AppError::Conflict("Event has been cancelled".into()));
            }
            QUEUE_NONBINDING_RESERVATION
        } else {
            match can_accept_registration(&event, &active, request.seats)? {
                AdmissionDecision::Regular => QUEUE_REGULAR,
                AdmissionDecision::WaitingList => QUEUE_WAITING_LIST,
                AdmissionDecision::Rejected => {
                    return Err(AppError::Conflict(
                        "Event cannot accept this registration".into(),
                    ));
                }
            }
        };

        let registration = Registration::new(NewRegistrationParams {
            event_id: event.id.clone(),
            attendee_name: request.attendee_name,
            attendee_email: request.attendee_email,
            seats: request.seats,
            queue_status: queue_status.to_string(),
        });
        let created = self.registrations.create(&registration).await?;
        info!(
            "Accepted registration {} for event {} as {}",
            created.id, event.id, created.queue_status
        );

        if created.is_regular() {
            self.notify_minimum_reached(&event).await;
        }

        Ok(created)
    }

    /// Soft-removes a registration and promotes the head of the waiting
    /// list when a regular seat frees up. Unknown and already-removed ids
    /// are tolerated silently: idempotent retry is part of the contract.
    pub async fn remove_registration(&self, registration_id: &str) -> Result<(), AppError> {
        let Some(probe) = self.registrations.find_by_id(registration_id).await? else {
            return Ok(());
        };

        let lock = self.locks.for_event(&probe.event_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent call may have won the race.
        let Some(mut registration) = self.registrations.find_by_id(registration_id).await? else {
            return Ok(());
        };
        if registration.removed {
            return Ok(());
        }

        let was_regular = registration.is_regular();
        registration.removed = true;
        self.registrations.update(&registration).await?;
        info!(
            "Removed registration {} ({} seats) from event {}",
            registration.id, registration.seats, registration.event_id
        );

        if was_regular && self.auto_promotion {
            self.promote_head_of_queue(&registration.event_id).await?;
        }

        Ok(())
    }

    /// At most one promotion per removal: the earliest waiting-list entry
    /// moves up if it fits the vacancy, otherwise nothing happens. No
    /// repacking of deeper entries.
    async fn promote_head_of_queue(&self, event_id: &str) -> Result<(), AppError> {
        let event = self.events.find_by_id(event_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let active = self.registrations.list_active_by_event(event_id).await?;

        // list is ordered (created_at, id) ascending, so the first waiting
        // entry is the head of the queue.
        let Some(head) = active.iter().find(|r| r.is_waiting()) else {
            return Ok(());
        };

        let fits = match vacancies(&event, &active) {
            None => true,
            Some(v) => head.seats <= v,
        };
        if !fits {
            return Ok(());
        }

        let mut promoted = head.clone();
        promoted.queue_status = QUEUE_REGULAR.to_string();
        let promoted = self.registrations.update(&promoted).await?;
        info!("Promoted registration {} from the waiting list of event {}", promoted.id, event.id);

        self.notify_promoted(&event, &promoted).await;
        Ok(())
    }

    /// Dispatch failures never roll back the promotion; the ledger keeps a
    /// retried removal from notifying twice.
    async fn notify_promoted(&self, event: &Event, registration: &Registration) {
        let recipient = &registration.attendee_email;
        let hash = context_hash(TEMPLATE_WAITLIST_PROMOTED, &event.id, recipient);

        match self.notification_log.has_been_sent(recipient, TEMPLATE_WAITLIST_PROMOTED, &hash).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                warn!("Ledger lookup failed for promoted attendee {}: {}", recipient, e);
                return;
            }
        }

        let params = json!({
            "event_id": event.id,
            "event_title": event.title,
            "seats": registration.seats,
        });

        let status = match self.dispatcher.notify(event, recipient, TEMPLATE_WAITLIST_PROMOTED, &params).await {
            Ok(()) => LOG_STATUS_SENT,
            Err(e) => {
                warn!("Could not notify promoted attendee {}: {}", recipient, e);
                LOG_STATUS_FAILED
            }
        };
        let entry = NotificationLog::new(&event.id, recipient, TEMPLATE_WAITLIST_PROMOTED, &hash, status);
        if let Err(e) = self.notification_log.log(&entry).await {
            warn!("Could not record promotion notification for {}: {}", recipient, e);
        }
    }

    /// One-shot organizer notification the moment the minimum attendance is
    /// reached. Independent of the automatic status change opt-in. The flag
    /// is only set once every organizer has a delivered copy, so a partial
    /// dispatch failure is retried by the next accepted registration.
    async fn notify_minimum_reached(&self, event: &Event) {
        if event.organizers_notified_minimum_reached {
            return;
        }

        let active = match self.registrations.list_active_by_event(&event.id).await {
            Ok(regs) => regs,
            Err(e) => {
                warn!("Could not load registrations for minimum check on event {}: {}", event.id, e);
                return;
            }
        };
        if !has_enough_registrations(event, &active) {
            return;
        }

        let organizers = match self.organizers.list_by_event(&event.id).await {
            Ok(o) => o,
            Err(e) => {
                warn!("Could not load organizers for event {}: {}", event.id, e);
                return;
            }
        };

        let params = json!({
            "event_id": event.id,
            "event_title": event.title,
            "occupied_seats": occupied_seats(event, &active),
            "min_attendees": event.min_attendees,
        });

        let mut all_delivered = true;
        for organizer in &organizers {
            let hash = context_hash(TEMPLATE_MINIMUM_REACHED, &event.id, &organizer.email);
            match self.notification_log.has_been_sent(&organizer.email, TEMPLATE_MINIMUM_REACHED, &hash).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!("Ledger lookup failed for {}: {}", organizer.email, e);
                    all_delivered = false;
                    continue;
                }
            }

            let status = match self.dispatcher.notify(event, &organizer.email, TEMPLATE_MINIMUM_REACHED, &params).await {
                Ok(()) => LOG_STATUS_SENT,
                Err(e) => {
                    warn!("Minimum-reached dispatch to {} failed: {}", organizer.email, e);
                    all_delivered = false;
                    LOG_STATUS_FAILED
                }
            };
            let entry = NotificationLog::new(&event.id, &organizer.email, TEMPLATE_MINIMUM_REACHED, &hash, status);
            if let Err(e) = self.notification_log.log(&entry).await {
                warn!("Could not record minimum-reached notification: {}", e);
            }
        }

        if all_delivered {
            let mut updated = event.clone();
            updated.organizers_notified_minimum_reached = true;
            if let Err(e) = self.events.update(&updated).await {
                warn!("Could not persist minimum-reached flag for event {}: {}", event.id, e);
            }
        }
    }
}
