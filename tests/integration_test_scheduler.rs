mod common;

use chrono::{Duration, Utc};
use common::{EventSeed, TestApp, TestOptions};
use seminar_backend::domain::models::event::{STATUS_CANCELLED, STATUS_CONFIRMED, STATUS_PLANNED};
use seminar_backend::domain::models::notification::{
    TEMPLATE_CANCELLATION_DEADLINE_REMINDER, TEMPLATE_EVENT_CANCELLED, TEMPLATE_EVENT_CONFIRMED,
    TEMPLATE_TAKES_PLACE_REMINDER,
};

#[tokio::test]
async fn test_takes_place_reminder_goes_to_every_organizer() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.set_event_status(&event.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&event.id, "one@example.com").await;
    app.seed_organizer(&event.id, "two@example.com").await;

    let report = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(report.takes_place_reminders, 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "one@example.com"), 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "two@example.com"), 1);
    assert!(app.reload_event(&event.id).await.takes_place_reminder_sent);
}

#[tokio::test]
async fn test_takes_place_reminder_is_sent_at_most_once() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.set_event_status(&event.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&event.id, "one@example.com").await;

    app.state.scheduler.run_once(Utc::now()).await;
    let second = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(second.takes_place_reminders, 0);
    assert_eq!(app.dispatcher.count_template(TEMPLATE_TAKES_PLACE_REMINDER), 1);
}

#[tokio::test]
async fn test_takes_place_reminder_respects_lead_window() {
    let app = TestApp::new().await;
    let far_out = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(30)),
        ..Default::default()
    }).await;
    app.set_event_status(&far_out.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&far_out.id, "one@example.com").await;

    let already_begun = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() - Duration::hours(1)),
        ..Default::default()
    }).await;
    app.set_event_status(&already_begun.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&already_begun.id, "two@example.com").await;

    let report = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(report.takes_place_reminders, 0);
    assert_eq!(app.dispatcher.count_template(TEMPLATE_TAKES_PLACE_REMINDER), 0);
    assert!(!app.reload_event(&far_out.id).await.takes_place_reminder_sent);
}

#[tokio::test]
async fn test_takes_place_reminder_skips_planned_events() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.seed_organizer(&event.id, "one@example.com").await;

    app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.count_template(TEMPLATE_TAKES_PLACE_REMINDER), 0);
}

#[tokio::test]
async fn test_zero_lead_days_disables_takes_place_reminder() {
    let app = TestApp::with_options(TestOptions { reminder_lead_days: 0, ..Default::default() }).await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(1)),
        ..Default::default()
    }).await;
    app.set_event_status(&event.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&event.id, "one@example.com").await;

    app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.total(), 0);
    assert!(!app.reload_event(&event.id).await.takes_place_reminder_sent);
}

#[tokio::test]
async fn test_partial_dispatch_failure_retries_only_missing_recipients() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.set_event_status(&event.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&event.id, "ok@example.com").await;
    app.seed_organizer(&event.id, "broken@example.com").await;

    app.dispatcher.set_fail_recipient(Some("broken@example.com"));
    let report = app.state.scheduler.run_once(Utc::now()).await;

    // one copy out the door, but the flag stays unset until all are delivered
    assert_eq!(report.takes_place_reminders, 0);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "ok@example.com"), 1);
    assert!(!app.reload_event(&event.id).await.takes_place_reminder_sent);

    app.dispatcher.set_fail_recipient(None);
    let report = app.state.scheduler.run_once(Utc::now()).await;

    // the ledger keeps the delivered organizer from getting a second copy
    assert_eq!(report.takes_place_reminders, 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "ok@example.com"), 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "broken@example.com"), 1);
    assert!(app.reload_event(&event.id).await.takes_place_reminder_sent);
}

#[tokio::test]
async fn test_cancellation_deadline_reminder_fires_inside_speaker_window() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(5)),
        ..Default::default()
    }).await;
    app.seed_organizer(&event.id, "one@example.com").await;
    app.seed_speaker(&event.id, 7).await;

    let report = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(report.cancellation_reminders, 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_CANCELLATION_DEADLINE_REMINDER, "one@example.com"), 1);
    assert!(app.reload_event(&event.id).await.cancellation_deadline_reminder_sent);

    let second = app.state.scheduler.run_once(Utc::now()).await;
    assert_eq!(second.cancellation_reminders, 0);
    assert_eq!(app.dispatcher.count_template(TEMPLATE_CANCELLATION_DEADLINE_REMINDER), 1);
}

#[tokio::test]
async fn test_cancellation_deadline_reminder_waits_for_the_window() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(10)),
        ..Default::default()
    }).await;
    app.seed_organizer(&event.id, "one@example.com").await;
    app.seed_speaker(&event.id, 7).await;

    app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.count_template(TEMPLATE_CANCELLATION_DEADLINE_REMINDER), 0);
    assert!(!app.reload_event(&event.id).await.cancellation_deadline_reminder_sent);
}

#[tokio::test]
async fn test_speakers_without_period_do_not_trigger_reminder() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(2)),
        ..Default::default()
    }).await;
    app.seed_organizer(&event.id, "one@example.com").await;
    app.seed_speaker(&event.id, 0).await;

    app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.count_template(TEMPLATE_CANCELLATION_DEADLINE_REMINDER), 0);
}

#[tokio::test]
async fn test_cancellation_reminder_can_be_disabled() {
    let app = TestApp::with_options(TestOptions {
        cancellation_reminder_enabled: false,
        ..Default::default()
    }).await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(2)),
        ..Default::default()
    }).await;
    app.seed_organizer(&event.id, "one@example.com").await;
    app.seed_speaker(&event.id, 7).await;

    app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.count_template(TEMPLATE_CANCELLATION_DEADLINE_REMINDER), 0);
}

#[tokio::test]
async fn test_status_sweep_confirms_and_cancels_due_events() {
    let app = TestApp::new().await;

    let filled = app.seed_event(EventSeed {
        min_attendees: 1,
        offline_attendees: 1,
        automatic_status_change: true,
        ..Default::default()
    }).await;
    app.seed_organizer(&filled.id, "filled@example.com").await;

    let expired = app.seed_event(EventSeed {
        min_attendees: 5,
        registration_deadline: Some(Utc::now() - Duration::days(1)),
        automatic_status_change: true,
        ..Default::default()
    }).await;
    app.seed_organizer(&expired.id, "expired@example.com").await;

    // opted out: identical shape to `expired` but without the flag
    let manual = app.seed_event(EventSeed {
        min_attendees: 5,
        registration_deadline: Some(Utc::now() - Duration::days(1)),
        automatic_status_change: false,
        ..Default::default()
    }).await;

    let report = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(report.events_confirmed, 1);
    assert_eq!(report.events_cancelled, 1);
    assert_eq!(app.reload_event(&filled.id).await.status, STATUS_CONFIRMED);
    assert_eq!(app.reload_event(&expired.id).await.status, STATUS_CANCELLED);
    assert_eq!(app.reload_event(&manual.id).await.status, STATUS_PLANNED);

    assert_eq!(app.dispatcher.count_template(TEMPLATE_EVENT_CONFIRMED), 1);
    assert_eq!(app.dispatcher.count_template(TEMPLATE_EVENT_CANCELLED), 1);
}

#[tokio::test]
async fn test_back_to_back_runs_produce_no_duplicate_side_effects() {
    let app = TestApp::new().await;

    let reminded = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.set_event_status(&reminded.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&reminded.id, "reminded@example.com").await;

    let swept = app.seed_event(EventSeed {
        min_attendees: 1,
        offline_attendees: 1,
        automatic_status_change: true,
        ..Default::default()
    }).await;
    app.seed_organizer(&swept.id, "swept@example.com").await;

    app.state.scheduler.run_once(Utc::now()).await;
    let after_first = app.dispatcher.total();

    let report = app.state.scheduler.run_once(Utc::now()).await;

    assert_eq!(app.dispatcher.total(), after_first);
    assert_eq!(report.takes_place_reminders, 0);
    assert_eq!(report.events_confirmed, 0);
    assert_eq!(report.events_cancelled, 0);
}

#[tokio::test]
async fn test_total_outage_leaves_everything_retryable() {
    let app = TestApp::new().await;
    let event = app.seed_event(EventSeed {
        begin_date: Some(Utc::now() + Duration::days(3)),
        ..Default::default()
    }).await;
    app.set_event_status(&event.id, STATUS_CONFIRMED).await;
    app.seed_organizer(&event.id, "one@example.com").await;

    app.dispatcher.set_fail_all(true);
    let report = app.state.scheduler.run_once(Utc::now()).await;
    assert_eq!(report.takes_place_reminders, 0);
    assert!(!app.reload_event(&event.id).await.takes_place_reminder_sent);

    app.dispatcher.set_fail_all(false);
    let report = app.state.scheduler.run_once(Utc::now()).await;
    assert_eq!(report.takes_place_reminders, 1);
    assert_eq!(app.dispatcher.count(TEMPLATE_TAKES_PLACE_REMINDER, "one@example.com"), 1);
}
