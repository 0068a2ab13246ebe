use seminar_backend::{
    api::router::create_router,
    config::Config,
    domain::models::event::{Event, NewEventParams},
    domain::models::organizer::Organizer,
    domain::models::registration::{NewRegistrationParams, Registration},
    domain::models::speaker::Speaker,
    domain::ports::NotificationDispatcher,
    domain::services::locks::EventLocks,
    domain::services::registration_queue::RegistrationQueueManager,
    domain::services::scheduler::{ReminderScheduler, SchedulerConfig},
    domain::services::status_engine::StatusChangeService,
    error::AppError,
    infra::repositories::{
        sqlite_event_repo::SqliteEventRepo,
        sqlite_notification_log_repo::SqliteNotificationLogRepo,
        sqlite_organizer_repo::SqliteOrganizerRepo,
        sqlite_registration_repo::SqliteRegistrationRepo,
        sqlite_speaker_repo::SqliteSpeakerRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DispatchCall {
    pub event_id: String,
    pub recipient: String,
    pub template_key: String,
}

/// Records every successful dispatch. Failures can be simulated globally or
/// for a single recipient to exercise the retry paths.
#[derive(Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<DispatchCall>>,
    fail_all: AtomicBool,
    fail_recipient: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl RecordingDispatcher {
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn count(&self, template_key: &str, recipient: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.template_key == template_key && c.recipient == recipient)
            .count()
    }

    pub fn count_template(&self, template_key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.template_key == template_key)
            .count()
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_recipient(&self, recipient: Option<&str>) {
        *self.fail_recipient.lock().unwrap() = recipient.map(|r| r.to_string());
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(
        &self,
        event: &Event,
        recipient: &str,
        template_key: &str,
        _params: &Value,
    ) -> Result<(), AppError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(AppError::Dispatch("simulated mail outage".into()));
        }
        if let Some(failing) = self.fail_recipient.lock().unwrap().as_deref()
            && failing == recipient
        {
            return Err(AppError::Dispatch(format!("simulated failure for {}", recipient)));
        }
        self.calls.lock().unwrap().push(DispatchCall {
            event_id: event.id.clone(),
            recipient: recipient.to_string(),
            template_key: template_key.to_string(),
        });
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub struct TestOptions {
    pub reminder_lead_days: i64,
    pub cancellation_reminder_enabled: bool,
    pub auto_promotion_enabled: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            reminder_lead_days: 7,
            cancellation_reminder_enabled: true,
            auto_promotion_enabled: true,
        }
    }
}

pub struct EventSeed {
    pub slug: String,
    pub min_attendees: i32,
    pub max_attendees: i32,
    pub offline_attendees: i32,
    pub queue_size: i32,
    pub begin_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_status_change: bool,
}

impl Default for EventSeed {
    fn default() -> Self {
        Self {
            slug: format!("seminar-{}", Uuid::new_v4()),
            min_attendees: 0,
            max_attendees: 0,
            offline_attendees: 0,
            queue_size: 0,
            begin_date: None,
            registration_deadline: None,
            automatic_status_change: false,
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            reminder_lead_days: options.reminder_lead_days,
            cancellation_reminder_enabled: options.cancellation_reminder_enabled,
            auto_promotion_enabled: options.auto_promotion_enabled,
            scheduler_interval_secs: 60,
        };

        let event_repo = Arc::new(SqliteEventRepo::new(pool.clone()));
        let registration_repo = Arc::new(SqliteRegistrationRepo::new(pool.clone()));
        let organizer_repo = Arc::new(SqliteOrganizerRepo::new(pool.clone()));
        let speaker_repo = Arc::new(SqliteSpeakerRepo::new(pool.clone()));
        let notification_log_repo = Arc::new(SqliteNotificationLogRepo::new(pool.clone()));
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let locks = Arc::new(EventLocks::new());

        let queue_manager = Arc::new(RegistrationQueueManager::new(
            event_repo.clone(),
            registration_repo.clone(),
            organizer_repo.clone(),
            dispatcher.clone(),
            notification_log_repo.clone(),
            locks.clone(),
            options.auto_promotion_enabled,
        ));

        let status_service = Arc::new(StatusChangeService::new(
            event_repo.clone(),
            registration_repo.clone(),
            organizer_repo.clone(),
            dispatcher.clone(),
            notification_log_repo.clone(),
            locks.clone(),
        ));

        let scheduler = Arc::new(ReminderScheduler::new(
            event_repo.clone(),
            organizer_repo.clone(),
            speaker_repo.clone(),
            dispatcher.clone(),
            notification_log_repo.clone(),
            status_service.clone(),
            SchedulerConfig {
                reminder_lead_days: options.reminder_lead_days,
                cancellation_reminder_enabled: options.cancellation_reminder_enabled,
            },
        ));

        let state = Arc::new(AppState {
            config,
            event_repo,
            registration_repo,
            organizer_repo,
            speaker_repo,
            notification_log_repo,
            dispatcher: dispatcher.clone(),
            queue_manager,
            status_service,
            scheduler,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            dispatcher,
        }
    }

    pub async fn seed_event(&self, seed: EventSeed) -> Event {
        let event = Event::new(NewEventParams {
            slug: seed.slug,
            title: "Intro Seminar".to_string(),
            description: String::new(),
            location: String::new(),
            timezone: "UTC".to_string(),
            begin_date: seed.begin_date,
            registration_deadline: seed.registration_deadline,
            min_attendees: seed.min_attendees,
            max_attendees: seed.max_attendees,
            offline_attendees: seed.offline_attendees,
            queue_size: seed.queue_size,
            automatic_status_change: seed.automatic_status_change,
        });
        self.state.event_repo.create(&event).await.unwrap()
    }

    pub async fn set_event_status(&self, event_id: &str, status: &str) -> Event {
        let mut event = self.reload_event(event_id).await;
        event.status = status.to_string();
        self.state.event_repo.update(&event).await.unwrap()
    }

    pub async fn reload_event(&self, event_id: &str) -> Event {
        self.state.event_repo.find_by_id(event_id).await.unwrap().unwrap()
    }

    pub async fn seed_registration(
        &self,
        event_id: &str,
        seats: i32,
        queue_status: &str,
        created_at: DateTime<Utc>,
    ) -> Registration {
        let mut registration = Registration::new(NewRegistrationParams {
            event_id: event_id.to_string(),
            attendee_name: "Attendee".to_string(),
            attendee_email: format!("attendee-{}@example.com", Uuid::new_v4()),
            seats,
            queue_status: queue_status.to_string(),
        });
        registration.created_at = created_at;
        self.state.registration_repo.create(&registration).await.unwrap()
    }

    pub async fn reload_registration(&self, id: &str) -> Registration {
        self.state.registration_repo.find_by_id(id).await.unwrap().unwrap()
    }

    pub async fn seed_organizer(&self, event_id: &str, email: &str) -> Organizer {
        let organizer = Organizer::new(event_id.to_string(), "Organizer".to_string(), email.to_string());
        self.state.organizer_repo.create(&organizer).await.unwrap()
    }

    pub async fn seed_speaker(&self, event_id: &str, cancellation_period_days: i32) -> Speaker {
        let speaker = Speaker::new(
            event_id.to_string(),
            "Speaker".to_string(),
            None,
            cancellation_period_days,
        );
        self.state.speaker_repo.create(&speaker).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
