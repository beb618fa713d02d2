//! Shared data model: backend wire types and engagement events.
//!
//! Wire types mirror the backend's JSON (snake_case keys) with `#[serde(default)]`
//! on every field so new server fields never break deserialization.

use serde::{Deserialize, Serialize};

use crate::daykey::DayKey;

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Progress snapshot
// ---------------------------------------------------------------------------

/// A logged meal from the progress feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealLog {
    /// Raw date token as recorded by the backend ("today", "2 days ago", ISO-8601, ...).
    #[serde(default)]
    pub logged_at: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// A logged workout from the progress feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutLog {
    #[serde(default)]
    pub logged_at: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// A daily check-in from the progress feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinLog {
    #[serde(default)]
    pub logged_at: Option<String>,
    /// A check-in record that exists counts as done unless the backend says otherwise.
    #[serde(default = "default_true")]
    pub completed: bool,
}

impl Default for CheckinLog {
    fn default() -> Self {
        Self {
            logged_at: None,
            completed: true,
        }
    }
}

/// The backend's per-user progress payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub meals: Vec<MealLog>,
    #[serde(default)]
    pub workouts: Vec<WorkoutLog>,
    #[serde(default)]
    pub checkins: Vec<CheckinLog>,
    /// Pre-aggregated checklist, trusted verbatim when present.
    #[serde(default)]
    pub daily_checklist: Option<DailyChecklist>,
}

/// Today's checklist state (3 meals, 1 workout, 1 check-in).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChecklist {
    #[serde(default)]
    pub meals_logged: u32,
    #[serde(default)]
    pub workouts_logged: u32,
    #[serde(default)]
    pub checkin_done: bool,
    #[serde(default)]
    pub checklist_done: bool,
}

// ---------------------------------------------------------------------------
// Gamification
// ---------------------------------------------------------------------------

/// Backend-computed XP/level/streak state. The client only displays this;
/// it never computes streak math itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamificationSummary {
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub next_level_points: u64,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub best_streak_days: u32,
    #[serde(default)]
    pub freeze_streaks: u32,
    #[serde(default)]
    pub used_freeze_streaks: u32,
    #[serde(default)]
    pub share_text: Option<String>,
}

/// Response to the app-open signal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppOpenResponse {
    #[serde(default)]
    pub gamification: GamificationSummary,
    /// The streak is at risk; the user must decide before other streak UI proceeds.
    #[serde(default)]
    pub freeze_prompt_required: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub streak_reset: bool,
}

/// Response to a submitted freeze decision.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreakDecisionResponse {
    #[serde(default)]
    pub gamification: GamificationSummary,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Engagement events
// ---------------------------------------------------------------------------

/// Side effects the tracker asks the host to render.
///
/// The tracker decides *when* something fires (once-per-day gates, one-shot
/// celebration); the host decides *how* it looks (overlay, toast, spoken
/// encouragement, notification).
#[derive(Debug, Clone, PartialEq)]
pub enum EngagementEvent {
    /// First completion of today's checklist. Fires at most once per day key.
    DayComplete { day: DayKey },
    /// Daily coach greeting, first open of the day.
    CoachGreeting { day: DayKey },
    /// End-of-day check-in prompt (local hour >= configured threshold).
    EndOfDayPrompt { day: DayKey },
    /// Reminder that today's checklist is still incomplete.
    ChecklistReminder { day: DayKey, checklist: DailyChecklist },
    /// Level increased since the previously displayed summary.
    LevelUp { from: u32, to: u32 },
    /// Points increased without a level change.
    PointsGained { delta: u64, total: u64 },
    /// Backend requires a freeze decision; block other streak UI until resolved.
    FreezePromptRequired { message: String, streak_days: u32 },
    /// Backend reset the streak on its own.
    StreakReset { message: String },
}

/// Host-provided receiver for engagement events.
pub trait EventSink {
    fn emit(&mut self, event: EngagementEvent);
}

/// Collects events into a `Vec`. Used by tests and simple hosts.
#[derive(Debug, Default)]
pub struct VecSink(pub Vec<EngagementEvent>);

impl EventSink for VecSink {
    fn emit(&mut self, event: EngagementEvent) {
        self.0.push(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
