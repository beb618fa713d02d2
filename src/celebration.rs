//! One-shot day-complete celebration.
//!
//! Per day key the trigger has two states, not-celebrated and celebrated, and
//! only the forward edge exists: once a day has celebrated it never re-fires,
//! even if logs are later edited back below the threshold. Session-scoped:
//! reopening the app on the same day after completion does not need to
//! celebrate again, so there is nothing to persist.

use std::collections::HashSet;

use crate::daykey::DayKey;
use crate::types::DailyChecklist;

#[derive(Debug, Default)]
pub struct CelebrationTrigger {
    celebrated: HashSet<DayKey>,
}

impl CelebrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest aggregation for `day`. Returns `true` exactly once per
    /// day key: the first time the checklist reports complete.
    pub fn on_checklist(&mut self, day: DayKey, checklist: &DailyChecklist) -> bool {
        if !checklist.checklist_done {
            return false;
        }
        self.celebrated.insert(day)
    }

    /// Whether `day` has already celebrated this session.
    pub fn has_celebrated(&self, day: DayKey) -> bool {
        self.celebrated.contains(&day)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
