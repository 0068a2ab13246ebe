use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{
    EventRepository, NotificationDispatcher, NotificationLogRepository, OrganizerRepository,
    RegistrationRepository, SpeakerRepository,
};
use crate::domain::services::locks::EventLocks;
use crate::domain::services::registration_queue::RegistrationQueueManager;
use crate::domain::services::scheduler::{ReminderScheduler, SchedulerConfig};
use crate::domain::services::status_engine::StatusChangeService;
use crate::infra::notify::http_dispatcher::HttpNotificationDispatcher;
use crate::infra::repositories::{
    postgres_event_repo::PostgresEventRepo, postgres_notification_log_repo::PostgresNotificationLogRepo,
    postgres_organizer_repo::PostgresOrganizerRepo, postgres_registration_repo::PostgresRegistrationRepo,
    postgres_speaker_repo::PostgresSpeakerRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_notification_log_repo::SqliteNotificationLogRepo,
    sqlite_organizer_repo::SqliteOrganizerRepo, sqlite_registration_repo::SqliteRegistrationRepo,
    sqlite_speaker_repo::SqliteSpeakerRepo,
};
use crate::state::AppState;

struct Repos {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    organizers: Arc<dyn OrganizerRepository>,
    speakers: Arc<dyn SpeakerRepository>,
    notification_logs: Arc<dyn NotificationLogRepository>,
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(HttpNotificationDispatcher::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Repos {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepo::new(pool.clone())),
            organizers: Arc::new(PostgresOrganizerRepo::new(pool.clone())),
            speakers: Arc::new(PostgresSpeakerRepo::new(pool.clone())),
            notification_logs: Arc::new(PostgresNotificationLogRepo::new(pool.clone())),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Repos {
            events: Arc::new(SqliteEventRepo::new(pool.clone())),
            registrations: Arc::new(SqliteRegistrationRepo::new(pool.clone())),
            organizers: Arc::new(SqliteOrganizerRepo::new(pool.clone())),
            speakers: Arc::new(SqliteSpeakerRepo::new(pool.clone())),
            notification_logs: Arc::new(SqliteNotificationLogRepo::new(pool.clone())),
        }
    };

    build_state(config, repos, dispatcher)
}

fn build_state(config: &Config, repos: Repos, dispatcher: Arc<dyn NotificationDispatcher>) -> AppState {
    let locks = Arc::new(EventLocks::new());

    let queue_manager = Arc::new(RegistrationQueueManager::new(
        repos.events.clone(),
        repos.registrations.clone(),
        repos.organizers.clone(),
        dispatcher.clone(),
        repos.notification_logs.clone(),
        locks.clone(),
        config.auto_promotion_enabled,
    ));

    let status_service = Arc::new(StatusChangeService::new(
        repos.events.clone(),
        repos.registrations.clone(),
        repos.organizers.clone(),
        dispatcher.clone(),
        repos.notification_logs.clone(),
        locks.clone(),
    ));

    let scheduler = Arc::new(ReminderScheduler::new(
        repos.events.clone(),
        repos.organizers.clone(),
        repos.speakers.clone(),
        dispatcher.clone(),
        repos.notification_logs.clone(),
        status_service.clone(),
        SchedulerConfig {
            reminder_lead_days: config.reminder_lead_days,
            cancellation_reminder_enabled: config.cancellation_reminder_enabled,
        },
    ));

    AppState {
        config: config.clone(),
        event_repo: repos.events,
        registration_repo: repos.registrations,
        organizer_repo: repos.organizers,
        speaker_repo: repos.speakers,
        notification_log_repo: repos.notification_logs,
        dispatcher,
        queue_manager,
        status_service,
        scheduler,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
