//! FitDay daily engagement tracker.
//!
//! Host-agnostic engine behind the trainer screen of the FitDay coaching
//! client: derives today's checklist (3 meals, 1 workout, 1 check-in) from the
//! backend's progress feed, fires a one-shot celebration when the day
//! completes, gates once-per-day prompts (end-of-day check-in, checklist
//! reminder, coach greeting), and relays streak freeze decisions. All scoring
//! and streak math is backend-authoritative; the tracker only aggregates,
//! gates, and emits [`types::EngagementEvent`]s for the host UI to render.

pub mod api;
pub mod celebration;
pub mod checklist;
pub mod config;
pub mod daykey;
pub mod prompts;
pub mod store;
pub mod streak;
pub mod tracker;
pub mod types;
