use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::domain::models::event::Event;
use crate::domain::models::notification::{
    context_hash, NotificationLog, LOG_STATUS_FAILED, LOG_STATUS_SENT,
    LOG_STATUS_SKIPPED_DUPLICATE, TEMPLATE_CANCELLATION_DEADLINE_REMINDER,
    TEMPLATE_TAKES_PLACE_REMINDER,
};
use crate::domain::models::speaker::Speaker;
use crate::domain::ports::{
    EventRepository, NotificationDispatcher, NotificationLogRepository, OrganizerRepository,
    SpeakerRepository,
};
use crate::domain::services::status_engine::{StatusChangeService, StatusDecision};
use crate::error::AppError;

#[derive(Clone, Copy)]
pub struct SchedulerConfig {
    /// 0 disables the takes-place reminder pass.
    pub reminder_lead_days: i64,
    pub cancellation_reminder_enabled: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerRunReport {
    pub takes_place_reminders: usize,
    pub cancellation_reminders: usize,
    pub events_confirmed: usize,
    pub events_cancelled: usize,
}

/// Periodic batch driver. Each `run_once` performs three independent,
/// idempotent passes; a failure on one event never aborts the rest of the
/// batch.
pub struct ReminderScheduler {
    events: Arc<dyn EventRepository>,
    organizers: Arc<dyn OrganizerRepository>,
    speakers: Arc<dyn SpeakerRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    notification_log: Arc<dyn NotificationLogRepository>,
    status_service: Arc<StatusChangeService>,
    config: SchedulerConfig,
}

impl ReminderScheduler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        organizers: Arc<dyn OrganizerRepository>,
        speakers: Arc<dyn SpeakerRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        notification_log: Arc<dyn NotificationLogRepository>,
        status_service: Arc<StatusChangeService>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            events,
            organizers,
            speakers,
            dispatcher,
            notification_log,
            status_service,
            config,
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> SchedulerRunReport {
        let mut report = SchedulerRunReport::default();
        self.send_takes_place_reminders(now, &mut report).await;
        self.send_cancellation_deadline_reminders(now, &mut report).await;
        self.run_status_sweep(now, &mut report).await;
        report
    }

    async fn send_takes_place_reminders(&self, now: DateTime<Utc>, report: &mut SchedulerRunReport) {
        if self.config.reminder_lead_days <= 0 {
            return;
        }
        let until = now + Duration::days(self.config.reminder_lead_days);
        let candidates = match self.events.find_takes_place_reminder_candidates(now, until).await {
            Ok(events) => events,
            Err(e) => {
                error!("Could not fetch takes-place reminder candidates: {}", e);
                return;
            }
        };

        for event in candidates {
            let Some(begin) = event.begin_date else { continue };
            let params = json!({
                "event_id": event.id,
                "event_title": event.title,
                "begin_date": format_in_event_zone(&event, begin),
                "days_until_begin": (begin - now).num_days(),
            });

            match self.notify_organizers(&event, TEMPLATE_TAKES_PLACE_REMINDER, &params).await {
                Ok(true) => {
                    let mut updated = event.clone();
                    updated.takes_place_reminder_sent = true;
                    match self.events.update(&updated).await {
                        Ok(_) => report.takes_place_reminders += 1,
                        Err(e) => warn!(
                            "Could not set takes-place flag for event {}, next run retries: {}",
                            event.id, e
                        ),
                    }
                }
                // Some dispatches failed: the flag stays unset so the next
                // run retries the recipients the ledger has no entry for.
                Ok(false) => {}
                Err(e) => error!("Takes-place reminder for event {} failed: {}", event.id, e),
            }
        }
    }

    async fn send_cancellation_deadline_reminders(
        &self,
        now: DateTime<Utc>,
        report: &mut SchedulerRunReport,
    ) {
        if !self.config.cancellation_reminder_enabled {
            return;
        }
        let candidates = match self.events.find_cancellation_reminder_candidates().await {
            Ok(events) => events,
            Err(e) => {
                error!("Could not fetch cancellation reminder candidates: {}", e);
                return;
            }
        };

        for event in candidates {
            let Some(begin) = event.begin_date else { continue };
            let speakers = match self.speakers.list_by_event(&event.id).await {
                Ok(s) => s,
                Err(e) => {
                    error!("Could not load speakers for event {}: {}", event.id, e);
                    continue;
                }
            };
            let Some(deadline) = earliest_cancellation_deadline(begin, &speakers) else {
                continue;
            };
            if now < deadline {
                continue;
            }

            let params = json!({
                "event_id": event.id,
                "event_title": event.title,
                "begin_date": format_in_event_zone(&event, begin),
                "cancellation_deadline": format_in_event_zone(&event, deadline),
            });

            match self.notify_organizers(&event, TEMPLATE_CANCELLATION_DEADLINE_REMINDER, &params).await {
                Ok(true) => {
                    let mut updated = event.clone();
                    updated.cancellation_deadline_reminder_sent = true;
                    match self.events.update(&updated).await {
                        Ok(_) => report.cancellation_reminders += 1,
                        Err(e) => warn!(
                            "Could not set cancellation-deadline flag for event {}, next run retries: {}",
                            event.id, e
                        ),
                    }
                }
                Ok(false) => {}
                Err(e) => error!(
                    "Cancellation-deadline reminder for event {} failed: {}",
                    event.id, e
                ),
            }
        }
    }

    async fn run_status_sweep(&self, now: DateTime<Utc>, report: &mut SchedulerRunReport) {
        let due = match self.events.find_due_for_automatic_evaluation().await {
            Ok(events) => events,
            Err(e) => {
                error!("Could not fetch events due for automatic evaluation: {}", e);
                return;
            }
        };

        for event in due {
            match self.status_service.process(&event.id, now).await {
                Ok(StatusDecision::Confirm) => report.events_confirmed += 1,
                Ok(StatusDecision::Cancel) => report.events_cancelled += 1,
                Ok(StatusDecision::NoChange) => {}
                Err(e) => error!("Automatic evaluation of event {} failed: {}", event.id, e),
            }
        }
    }

    /// Sends to every organizer of the event, deduplicating through the
    /// ledger. Returns whether every recipient now has a delivered copy —
    /// the condition for setting the event's one-shot flag.
    async fn notify_organizers(
        &self,
        event: &Event,
        template_key: &str,
        params: &Value,
    ) -> Result<bool, AppError> {
        let organizers = self.organizers.list_by_event(&event.id).await?;
        if organizers.is_empty() {
            warn!("Event {} has no organizers for {}", event.id, template_key);
            return Ok(true);
        }

        let mut all_delivered = true;
        for organizer in &organizers {
            let hash = context_hash(template_key, &event.id, &organizer.email);
            if self.notification_log.has_been_sent(&organizer.email, template_key, &hash).await? {
                let entry = NotificationLog::new(
                    &event.id,
                    &organizer.email,
                    template_key,
                    &hash,
                    LOG_STATUS_SKIPPED_DUPLICATE,
                );
                self.notification_log.log(&entry).await?;
                continue;
            }

            match self.dispatcher.notify(event, &organizer.email, template_key, params).await {
                Ok(()) => {
                    let entry = NotificationLog::new(
                        &event.id,
                        &organizer.email,
                        template_key,
                        &hash,
                        LOG_STATUS_SENT,
                    );
                    self.notification_log.log(&entry).await?;
                }
                Err(e) => {
                    warn!(
                        "Dispatch of {} to {} failed for event {}: {}",
                        template_key, organizer.email, event.id, e
                    );
                    all_delivered = false;
                    let entry = NotificationLog::new(
                        &event.id,
                        &organizer.email,
                        template_key,
                        &hash,
                        LOG_STATUS_FAILED,
                    );
                    if let Err(log_err) = self.notification_log.log(&entry).await {
                        warn!("Could not record failed dispatch: {}", log_err);
                    }
                }
            }
        }
        Ok(all_delivered)
    }
}

/// Earliest moment any speaker's cancellation window opens. Speakers
/// without a configured period do not participate.
fn earliest_cancellation_deadline(
    begin: DateTime<Utc>,
    speakers: &[Speaker],
) -> Option<DateTime<Utc>> {
    speakers
        .iter()
        .filter(|s| s.cancellation_period_days > 0)
        .map(|s| begin - Duration::days(s.cancellation_period_days as i64))
        .min()
}

fn format_in_event_zone(event: &Event, instant: DateTime<Utc>) -> String {
    let tz: Tz = event.timezone.parse().unwrap_or(chrono_tz::UTC);
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}
