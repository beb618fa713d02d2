//! Headless tracker runner.
//!
//! Stands in for the mobile shell during development: simulates one app-open
//! on startup, then refreshes on a timer, logging every engagement event a UI
//! would render. Exits non-zero only when configuration cannot be loaded;
//! every tracker-level failure is a logged no-op.

use std::time::Duration;

use fitday::api::BackendClient;
use fitday::config;
use fitday::prompts::PromptScheduler;
use fitday::store::{GateStore, MemoryGateStore, SqliteGateStore};
use fitday::tracker::EngagementTracker;
use fitday::types::{EngagementEvent, EventSink};

/// Renders engagement events as log lines.
struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: EngagementEvent) {
        match &event {
            EngagementEvent::DayComplete { day } => {
                log::info!("Day complete: {}, checklist done, celebrate!", day);
            }
            EngagementEvent::CoachGreeting { day } => {
                log::info!("Coach greeting for {}", day);
            }
            EngagementEvent::EndOfDayPrompt { day } => {
                log::info!("End-of-day check-in prompt for {}", day);
            }
            EngagementEvent::ChecklistReminder { day, checklist } => {
                log::info!(
                    "Checklist reminder for {}: {}/3 meals, {}/1 workouts, check-in {}",
                    day,
                    checklist.meals_logged,
                    checklist.workouts_logged,
                    if checklist.checkin_done { "done" } else { "pending" }
                );
            }
            EngagementEvent::LevelUp { from, to } => {
                log::info!("Level up: {} -> {}", from, to);
            }
            EngagementEvent::PointsGained { delta, total } => {
                log::info!("Points gained: +{} ({} total)", delta, total);
            }
            EngagementEvent::FreezePromptRequired { message, streak_days } => {
                log::warn!(
                    "Freeze decision required ({}-day streak): {}",
                    streak_days,
                    message
                );
            }
            EngagementEvent::StreakReset { message } => {
                log::warn!("Streak reset: {}", message);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let store: Box<dyn GateStore> = match SqliteGateStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            // Prompts may show every launch without persistence, but the
            // tracker keeps working.
            log::warn!("Prompt-gate store unavailable: {}; falling back to in-memory", e);
            Box::new(MemoryGateStore::new())
        }
    };

    let scheduler = PromptScheduler::with_end_of_day_hour(store, config.end_of_day_hour);
    let client = BackendClient::new(&config.backend_url);
    let mut tracker = EngagementTracker::new(client, &config.user_id, scheduler);
    let mut sink = LogSink;

    log::info!(
        "FitDay tracker starting for user {} against {}",
        config.user_id,
        config.backend_url
    );

    tracker.on_app_open(&mut sink).await;
    if tracker.streak_decision_required() {
        log::warn!(
            "Streak UI blocked until a freeze decision is submitted: {}",
            tracker.streak_prompt_message().unwrap_or_default()
        );
    }

    let mut interval =
        tokio::time::interval(Duration::from_secs(config.refresh_interval_minutes.max(1) * 60));
    // First tick resolves immediately; the on_app_open above already covered it.
    interval.tick().await;

    loop {
        interval.tick().await;
        tracker.refresh(&mut sink).await;
    }
}
