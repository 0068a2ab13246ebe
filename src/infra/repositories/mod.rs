pub mod sqlite_event_repo;
pub mod sqlite_registration_repo;
pub mod sqlite_organizer_repo;
pub mod sqlite_speaker_repo;
pub mod sqlite_notification_log_repo;

pub mod postgres_event_repo;
pub mod postgres_registration_repo;
pub mod postgres_organizer_repo;
pub mod postgres_speaker_repo;
pub mod postgres_notification_log_repo;
