use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, info_span, Instrument};
use crate::state::AppState;

/// Periodic driver for the reminder/status-change scheduler. The interval
/// comes from configuration; each tick is a full `run_once` pass over all
/// due events. Re-running is safe: every pass is idempotent.
pub async fn start_scheduler_worker(state: Arc<AppState>) {
    info!("Starting scheduler worker...");

    let interval = Duration::from_secs(state.config.scheduler_interval_secs);

    loop {
        let now = Utc::now();
        let span = info_span!("scheduler_run", run_at = %now);

        async {
            let report = state.scheduler.run_once(now).await;
            info!(
                takes_place_reminders = report.takes_place_reminders,
                cancellation_reminders = report.cancellation_reminders,
                events_confirmed = report.events_confirmed,
                events_cancelled = report.events_cancelled,
                "Scheduler run finished"
            );
        }
            .instrument(span)
            .await;

        sleep(interval).await;
    }
}
