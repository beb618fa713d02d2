//! Checklist aggregation.
//!
//! Derives today's checklist from the raw progress feed. When the backend
//! ships a pre-aggregated `daily_checklist` we use it verbatim (trust server);
//! otherwise we count entries whose date token normalizes to today's key.
//! Entries with unparseable tokens are skipped, never an error.

use chrono::{DateTime, Local};

use crate::daykey::{self, DayKey};
use crate::types::{DailyChecklist, ProgressSnapshot};

/// Meals required for a complete day. Product constant, not per-user.
pub const MEALS_REQUIRED: u32 = 3;
/// Workouts required for a complete day.
pub const WORKOUTS_REQUIRED: u32 = 1;

/// True when the counts satisfy the completion rule.
pub fn is_complete(meals_logged: u32, workouts_logged: u32, checkin_done: bool) -> bool {
    meals_logged >= MEALS_REQUIRED && workouts_logged >= WORKOUTS_REQUIRED && checkin_done
}

/// Aggregate a progress snapshot into today's checklist, relative to `now`.
pub fn aggregate(snapshot: &ProgressSnapshot, now: DateTime<Local>) -> DailyChecklist {
    if let Some(pre) = snapshot.daily_checklist {
        return pre;
    }

    let today = DayKey::from_datetime(now);

    let meals_logged = count_today(snapshot.meals.iter().map(|m| m.logged_at.as_deref()), today, now);
    let workouts_logged =
        count_today(snapshot.workouts.iter().map(|w| w.logged_at.as_deref()), today, now);
    let checkin_done = snapshot
        .checkins
        .iter()
        .filter(|c| c.completed)
        .any(|c| is_today(c.logged_at.as_deref(), today, now));

    DailyChecklist {
        meals_logged,
        workouts_logged,
        checkin_done,
        checklist_done: is_complete(meals_logged, workouts_logged, checkin_done),
    }
}

fn count_today<'a>(
    tokens: impl Iterator<Item = Option<&'a str>>,
    today: DayKey,
    now: DateTime<Local>,
) -> u32 {
    tokens.filter(|t| is_today(*t, today, now)).count() as u32
}

fn is_today(token: Option<&str>, today: DayKey, now: DateTime<Local>) -> bool {
    token
        .and_then(|t| daykey::normalize(t, now))
        .is_some_and(|key| key == today)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
