use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    /// Days before the begin date at which the takes-place reminder fires.
    /// 0 disables that reminder pass entirely.
    pub reminder_lead_days: i64,
    pub cancellation_reminder_enabled: bool,
    pub auto_promotion_enabled: bool,
    pub scheduler_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            reminder_lead_days: env::var("REMINDER_LEAD_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("REMINDER_LEAD_DAYS must be a number"),
            cancellation_reminder_enabled: env::var("CANCELLATION_REMINDER_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            auto_promotion_enabled: env::var("AUTO_PROMOTION_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            scheduler_interval_secs: env::var("SCHEDULER_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("SCHEDULER_INTERVAL_SECS must be a number"),
        }
    }
}
