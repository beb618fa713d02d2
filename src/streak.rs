//! Streak freeze-decision flow.
//!
//! The backend decides when a streak is at risk; the client only holds the
//! blocking "a decision is pending" state and relays the user's choice. While
//! a decision is pending, other streak UI actions are blocked. "Later" clears
//! the local block with no suppression; the backend will re-prompt on the
//! next qualifying open, unlike the once-per-day prompt gates.

use crate::types::AppOpenResponse;

/// The user's three-way choice when a freeze decision is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakDecision {
    /// Consume one freeze credit, keep the streak.
    UseFreeze,
    /// Accept the reset.
    Reset,
    /// Defer; re-prompts on the next qualifying app open.
    Later,
}

/// Local decision state. `AwaitingDecision` blocks streak UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FreezeDecisionState {
    #[default]
    Idle,
    AwaitingDecision {
        message: String,
    },
}

#[derive(Debug, Default)]
pub struct StreakFlow {
    state: FreezeDecisionState,
}

impl StreakFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an app-open response. Entering `AwaitingDecision` returns the
    /// prompt message so the caller can surface it.
    pub fn on_app_open(&mut self, resp: &AppOpenResponse) -> Option<&str> {
        self.state = if resp.freeze_prompt_required {
            FreezeDecisionState::AwaitingDecision {
                message: resp.message.clone(),
            }
        } else {
            FreezeDecisionState::Idle
        };
        self.prompt_message()
    }

    /// Whether streak UI actions are currently blocked.
    pub fn decision_required(&self) -> bool {
        matches!(self.state, FreezeDecisionState::AwaitingDecision { .. })
    }

    /// The pending prompt message, if any.
    pub fn prompt_message(&self) -> Option<&str> {
        match &self.state {
            FreezeDecisionState::AwaitingDecision { message } => Some(message),
            FreezeDecisionState::Idle => None,
        }
    }

    /// Resolve the pending decision locally (the caller submits use-freeze /
    /// reset to the backend; "Later" is local-only).
    pub fn resolve(&mut self) {
        self.state = FreezeDecisionState::Idle;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
