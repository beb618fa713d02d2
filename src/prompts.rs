//! Once-per-day prompt gating.
//!
//! Three independent gates, each keyed by the persisted day key of the last
//! time that prompt was shown: the end-of-day check-in prompt, the checklist
//! reminder, and the daily coach greeting. A gate fires at most once per day
//! key; the key is written only after the prompt was actually emitted, so a
//! second app-open in the same day stays quiet. A failing store degrades the
//! gate to "eligible every open", which is logged, never fatal.
//!
//! The gates are independent of each other and of the celebration trigger;
//! all three can fire in the same session. The checklist reminder is day-key
//! gated only: completing the checklist after the reminder was shown changes
//! nothing for that day.

use chrono::{DateTime, Local, Timelike};

use crate::daykey::DayKey;
use crate::store::GateStore;
use crate::types::DailyChecklist;

/// Persisted key for the end-of-day check-in prompt.
pub const END_OF_DAY_PROMPT_KEY: &str = "endOfDayPromptDate";
/// Persisted key for the checklist reminder.
pub const CHECKLIST_PROMPT_KEY: &str = "checklistPromptDate";
/// Persisted key for the daily coach greeting.
pub const COACH_GREETING_KEY: &str = "coachGreetingDay";

/// Default local hour from which the end-of-day prompt is eligible.
pub const DEFAULT_END_OF_DAY_HOUR: u32 = 20;

pub struct PromptScheduler {
    store: Box<dyn GateStore>,
    end_of_day_hour: u32,
}

impl PromptScheduler {
    pub fn new(store: Box<dyn GateStore>) -> Self {
        Self {
            store,
            end_of_day_hour: DEFAULT_END_OF_DAY_HOUR,
        }
    }

    pub fn with_end_of_day_hour(store: Box<dyn GateStore>, hour: u32) -> Self {
        Self {
            store,
            end_of_day_hour: hour,
        }
    }

    /// End-of-day prompt eligibility: local hour past the threshold and not
    /// yet shown for today's key.
    pub fn end_of_day_due(&self, now: DateTime<Local>) -> bool {
        now.hour() >= self.end_of_day_hour
            && self.gate_open(END_OF_DAY_PROMPT_KEY, DayKey::from_datetime(now))
    }

    /// Checklist reminder eligibility: checklist incomplete and not yet
    /// reminded for today's key.
    pub fn checklist_reminder_due(&self, checklist: &DailyChecklist, now: DateTime<Local>) -> bool {
        !checklist.checklist_done
            && self.gate_open(CHECKLIST_PROMPT_KEY, DayKey::from_datetime(now))
    }

    /// Coach greeting eligibility: first open of the day.
    pub fn coach_greeting_due(&self, now: DateTime<Local>) -> bool {
        self.gate_open(COACH_GREETING_KEY, DayKey::from_datetime(now))
    }

    /// Record that the end-of-day prompt was shown. Call immediately after
    /// emitting the prompt event.
    pub fn mark_end_of_day_shown(&mut self, now: DateTime<Local>) {
        self.mark_shown(END_OF_DAY_PROMPT_KEY, DayKey::from_datetime(now));
    }

    pub fn mark_checklist_reminder_shown(&mut self, now: DateTime<Local>) {
        self.mark_shown(CHECKLIST_PROMPT_KEY, DayKey::from_datetime(now));
    }

    pub fn mark_coach_greeting_shown(&mut self, now: DateTime<Local>) {
        self.mark_shown(COACH_GREETING_KEY, DayKey::from_datetime(now));
    }

    /// A gate is open when the stored last-shown key differs from today's.
    /// Store failures count as open so a broken store shows prompts rather
    /// than swallowing them.
    fn gate_open(&self, key: &str, today: DayKey) -> bool {
        match self.store.get(key) {
            Ok(Some(stored)) => DayKey::parse(&stored) != Some(today),
            Ok(None) => true,
            Err(e) => {
                log::warn!("Prompt store read failed for {}: {}; prompt may repeat", key, e);
                true
            }
        }
    }

    fn mark_shown(&mut self, key: &str, today: DayKey) {
        if let Err(e) = self.store.set(key, &today.to_string()) {
            log::warn!(
                "Prompt store write failed for {}: {}; prompt may repeat next open",
                key,
                e
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
