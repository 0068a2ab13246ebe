use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    EventRepository, NotificationDispatcher, NotificationLogRepository, OrganizerRepository,
    RegistrationRepository, SpeakerRepository,
};
use crate::domain::services::registration_queue::RegistrationQueueManager;
use crate::domain::services::scheduler::ReminderScheduler;
use crate::domain::services::status_engine::StatusChangeService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub organizer_repo: Arc<dyn OrganizerRepository>,
    pub speaker_repo: Arc<dyn SpeakerRepository>,
    pub notification_log_repo: Arc<dyn NotificationLogRepository>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub queue_manager: Arc<RegistrationQueueManager>,
    pub status_service: Arc<StatusChangeService>,
    pub scheduler: Arc<ReminderScheduler>,
}
