//! Engagement tracker engine.
//!
//! Owns all session state: the latest checklist, the celebration set, the
//! cached gamification summary, and the pending freeze-decision flag. A single
//! host task drives it; there is no internal locking. Network failures are
//! logged and skipped; prior state stays displayed.
//!
//! Refreshes carry a monotonically increasing generation. A result is applied
//! only if no newer refresh was issued since it started (last-write-wins by
//! issuance order, not arrival order), so a slow response can never clobber a
//! fresher one. Hosts that run their own fetches call [`begin_refresh`] /
//! [`apply_progress`] / [`apply_summary`] directly; [`refresh`] and
//! [`on_app_open`] bundle the common paths.
//!
//! [`begin_refresh`]: EngagementTracker::begin_refresh
//! [`apply_progress`]: EngagementTracker::apply_progress
//! [`apply_summary`]: EngagementTracker::apply_summary
//! [`refresh`]: EngagementTracker::refresh
//! [`on_app_open`]: EngagementTracker::on_app_open

use chrono::{DateTime, Local};

use crate::api::{ApiError, BackendClient};
use crate::celebration::CelebrationTrigger;
use crate::checklist;
use crate::daykey::DayKey;
use crate::prompts::PromptScheduler;
use crate::streak::{StreakDecision, StreakFlow};
use crate::types::{
    AppOpenResponse, DailyChecklist, EngagementEvent, EventSink, GamificationSummary,
    ProgressSnapshot,
};

pub struct EngagementTracker {
    client: BackendClient,
    user_id: String,
    scheduler: PromptScheduler,
    celebration: CelebrationTrigger,
    streak: StreakFlow,
    checklist: Option<DailyChecklist>,
    last_summary: Option<GamificationSummary>,
    /// Generation of the most recently issued refresh.
    issued: u64,
}

impl EngagementTracker {
    pub fn new(client: BackendClient, user_id: &str, scheduler: PromptScheduler) -> Self {
        Self {
            client,
            user_id: user_id.to_string(),
            scheduler,
            celebration: CelebrationTrigger::new(),
            streak: StreakFlow::new(),
            checklist: None,
            last_summary: None,
            issued: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle entry points
    // -----------------------------------------------------------------------

    /// App came to the foreground: greet once per day, notify the backend,
    /// then refresh progress and gamification.
    pub async fn on_app_open(&mut self, sink: &mut dyn EventSink) {
        let now = Local::now();
        if self.scheduler.coach_greeting_due(now) {
            sink.emit(EngagementEvent::CoachGreeting {
                day: DayKey::from_datetime(now),
            });
            self.scheduler.mark_coach_greeting_shown(now);
        }

        let generation = self.begin_refresh();
        match self.client.notify_app_open(&self.user_id).await {
            Ok(resp) => self.apply_app_open(generation, resp, sink),
            Err(e) => log::warn!("App-open notify failed: {}", e),
        }

        self.refresh(sink).await;
    }

    /// Fetch the latest progress and gamification snapshots and run the
    /// aggregator, celebration trigger, and prompt gates against them.
    /// Invoked on foreground, data-changed signals, and the periodic timer.
    pub async fn refresh(&mut self, sink: &mut dyn EventSink) {
        let generation = self.begin_refresh();
        let now = Local::now();

        match self.client.fetch_progress(&self.user_id).await {
            Ok(snapshot) => self.apply_progress(generation, &snapshot, now, sink),
            Err(e) => log::warn!("Progress fetch failed: {}; keeping last known state", e),
        }

        match self.client.fetch_gamification(&self.user_id).await {
            Ok(summary) => self.apply_summary(generation, summary, sink),
            Err(e) => log::warn!("Gamification fetch failed: {}; keeping last known state", e),
        }
    }

    /// Submit the user's freeze decision. `Later` only clears the local block;
    /// the backend re-prompts on the next qualifying open. On success the
    /// backend's message is returned for display.
    pub async fn submit_streak_decision(
        &mut self,
        decision: StreakDecision,
        sink: &mut dyn EventSink,
    ) -> Result<Option<String>, ApiError> {
        match decision {
            StreakDecision::Later => {
                self.streak.resolve();
                Ok(None)
            }
            StreakDecision::UseFreeze | StreakDecision::Reset => {
                let use_freeze = matches!(decision, StreakDecision::UseFreeze);
                let resp = self
                    .client
                    .submit_streak_decision(&self.user_id, use_freeze)
                    .await?;
                let generation = self.begin_refresh();
                self.apply_summary(generation, resp.gamification, sink);
                self.streak.resolve();
                Ok(Some(resp.message))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Generation-tagged appliers
    // -----------------------------------------------------------------------

    /// Issue a new refresh generation. Anything fetched under an older
    /// generation is stale once this returns.
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply a fetched progress snapshot, unless a newer refresh was issued.
    pub fn apply_progress(
        &mut self,
        generation: u64,
        snapshot: &ProgressSnapshot,
        now: DateTime<Local>,
        sink: &mut dyn EventSink,
    ) {
        if generation < self.issued {
            log::debug!(
                "Discarding stale progress snapshot (generation {} < {})",
                generation,
                self.issued
            );
            return;
        }

        let today = DayKey::from_datetime(now);
        let checklist = checklist::aggregate(snapshot, now);
        self.checklist = Some(checklist);

        if self.celebration.on_checklist(today, &checklist) {
            sink.emit(EngagementEvent::DayComplete { day: today });
        }

        if self.scheduler.end_of_day_due(now) {
            sink.emit(EngagementEvent::EndOfDayPrompt { day: today });
            self.scheduler.mark_end_of_day_shown(now);
        }

        if self.scheduler.checklist_reminder_due(&checklist, now) {
            sink.emit(EngagementEvent::ChecklistReminder {
                day: today,
                checklist,
            });
            self.scheduler.mark_checklist_reminder_shown(now);
        }
    }

    /// Apply a fetched gamification summary, diffing against the cached one
    /// to surface level-ups and point gains. Stale generations are dropped.
    pub fn apply_summary(
        &mut self,
        generation: u64,
        summary: GamificationSummary,
        sink: &mut dyn EventSink,
    ) {
        if generation < self.issued {
            log::debug!(
                "Discarding stale gamification summary (generation {} < {})",
                generation,
                self.issued
            );
            return;
        }

        if let Some(prev) = &self.last_summary {
            if summary.level > prev.level {
                sink.emit(EngagementEvent::LevelUp {
                    from: prev.level,
                    to: summary.level,
                });
            } else if summary.points > prev.points {
                sink.emit(EngagementEvent::PointsGained {
                    delta: summary.points - prev.points,
                    total: summary.points,
                });
            }
        }
        self.last_summary = Some(summary);
    }

    /// Apply an app-open response: surface resets, enter the blocking
    /// freeze-decision state if required, and diff the bundled summary.
    pub fn apply_app_open(
        &mut self,
        generation: u64,
        resp: AppOpenResponse,
        sink: &mut dyn EventSink,
    ) {
        if resp.streak_reset {
            sink.emit(EngagementEvent::StreakReset {
                message: resp.message.clone(),
            });
        }

        let streak_days = resp.gamification.streak_days;
        if let Some(message) = self.streak.on_app_open(&resp).map(str::to_string) {
            sink.emit(EngagementEvent::FreezePromptRequired {
                message,
                streak_days,
            });
        }

        self.apply_summary(generation, resp.gamification, sink);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The most recently applied checklist, if any refresh has landed.
    pub fn checklist(&self) -> Option<DailyChecklist> {
        self.checklist
    }

    /// The most recently applied gamification summary.
    pub fn gamification(&self) -> Option<&GamificationSummary> {
        self.last_summary.as_ref()
    }

    /// True while a freeze decision is pending; other streak UI is blocked.
    pub fn streak_decision_required(&self) -> bool {
        self.streak.decision_required()
    }

    /// The pending freeze prompt message, if any.
    pub fn streak_prompt_message(&self) -> Option<&str> {
        self.streak.prompt_message()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGateStore;
    use crate::types::{CheckinLog, MealLog, VecSink, WorkoutLog};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 8, 30, 14, 30, 0)
            .single()
            .expect("valid local datetime")
    }

    fn tracker() -> EngagementTracker {
        let client = BackendClient::new("http://localhost:8000");
        let scheduler = PromptScheduler::new(Box::new(MemoryGateStore::new()));
        EngagementTracker::new(client, "u-test", scheduler)
    }

    fn complete_snapshot() -> ProgressSnapshot {
        let meal = || MealLog {
            logged_at: Some("today".to_string()),
            ..Default::default()
        };
        ProgressSnapshot {
            meals: vec![meal(), meal(), meal()],
            workouts: vec![WorkoutLog {
                logged_at: Some("today".to_string()),
                ..Default::default()
            }],
            checkins: vec![CheckinLog {
                logged_at: Some("today".to_string()),
                completed: true,
            }],
            daily_checklist: None,
        }
    }

    fn summary(level: u32, points: u64) -> GamificationSummary {
        GamificationSummary {
            level,
            points,
            ..Default::default()
        }
    }

    #[test]
    fn test_stale_snapshot_discarded_by_issuance_order() {
        let mut t = tracker();
        let mut sink = VecSink::default();
        let now = fixed_now();

        let old_gen = t.begin_refresh();
        let new_gen = t.begin_refresh();

        // Newer request's (empty) response lands first.
        t.apply_progress(new_gen, &ProgressSnapshot::default(), now, &mut sink);
        let after_new = t.checklist();

        // Older request's complete snapshot arrives late: dropped entirely.
        t.apply_progress(old_gen, &complete_snapshot(), now, &mut sink);
        assert_eq!(t.checklist(), after_new);
        assert!(
            !sink.0.contains(&EngagementEvent::DayComplete {
                day: DayKey::from_datetime(now)
            }),
            "stale snapshot must not celebrate"
        );
    }

    #[test]
    fn test_celebration_once_across_refreshes() {
        let mut t = tracker();
        let mut sink = VecSink::default();
        let now = fixed_now();
        let day = DayKey::from_datetime(now);

        let g1 = t.begin_refresh();
        t.apply_progress(g1, &complete_snapshot(), now, &mut sink);
        let g2 = t.begin_refresh();
        t.apply_progress(g2, &complete_snapshot(), now, &mut sink);

        let celebrations = sink
            .0
            .iter()
            .filter(|e| matches!(e, EngagementEvent::DayComplete { day: d } if *d == day))
            .count();
        assert_eq!(celebrations, 1);
    }

    #[test]
    fn test_incomplete_day_emits_reminder_not_celebration() {
        let mut t = tracker();
        let mut sink = VecSink::default();
        let now = fixed_now();

        let g = t.begin_refresh();
        t.apply_progress(g, &ProgressSnapshot::default(), now, &mut sink);

        assert!(sink
            .0
            .iter()
            .any(|e| matches!(e, EngagementEvent::ChecklistReminder { .. })));
        assert!(!sink
            .0
            .iter()
            .any(|e| matches!(e, EngagementEvent::DayComplete { .. })));
    }

    #[test]
    fn test_complete_day_gets_no_reminder() {
        let mut t = tracker();
        let mut sink = VecSink::default();
        let now = fixed_now();

        let g = t.begin_refresh();
        t.apply_progress(g, &complete_snapshot(), now, &mut sink);

        assert!(!sink
            .0
            .iter()
            .any(|e| matches!(e, EngagementEvent::ChecklistReminder { .. })));
    }

    #[test]
    fn test_end_of_day_prompt_in_evening_refresh() {
        let mut t = tracker();
        let mut sink = VecSink::default();
        let evening = Local.with_ymd_and_hms(2026, 8, 30, 21, 0, 0).single().unwrap();

        let g1 = t.begin_refresh();
        t.apply_progress(g1, &ProgressSnapshot::default(), evening, &mut sink);
        let g2 = t.begin_refresh();
        t.apply_progress(g2, &ProgressSnapshot::default(), evening, &mut sink);

        let prompts = sink
            .0
            .iter()
            .filter(|e| matches!(e, EngagementEvent::EndOfDayPrompt { .. }))
            .count();
        assert_eq!(prompts, 1, "end-of-day prompt fires once per day");
    }

    #[test]
    fn test_first_summary_is_silent_then_diffs() {
        let mut t = tracker();
        let mut sink = VecSink::default();

        let g1 = t.begin_refresh();
        t.apply_summary(g1, summary(3, 900), &mut sink);
        assert!(sink.0.is_empty(), "nothing to diff against on first fetch");

        let g2 = t.begin_refresh();
        t.apply_summary(g2, summary(3, 950), &mut sink);
        assert_eq!(
            sink.0,
            vec![EngagementEvent::PointsGained {
                delta: 50,
                total: 950
            }]
        );

        let g3 = t.begin_refresh();
        t.apply_summary(g3, summary(4, 1000), &mut sink);
        assert!(sink
            .0
            .contains(&EngagementEvent::LevelUp { from: 3, to: 4 }));
    }

    #[test]
    fn test_freeze_prompt_blocks_streak_ui() {
        let mut t = tracker();
        let mut sink = VecSink::default();

        let resp = AppOpenResponse {
            gamification: GamificationSummary {
                streak_days: 12,
                ..Default::default()
            },
            freeze_prompt_required: true,
            message: "You'll lose your 12-day streak".to_string(),
            streak_reset: false,
        };

        let g = t.begin_refresh();
        t.apply_app_open(g, resp, &mut sink);

        assert!(t.streak_decision_required());
        assert_eq!(
            t.streak_prompt_message(),
            Some("You'll lose your 12-day streak")
        );
        assert!(sink.0.contains(&EngagementEvent::FreezePromptRequired {
            message: "You'll lose your 12-day streak".to_string(),
            streak_days: 12,
        }));
    }

    #[tokio::test]
    async fn test_later_defers_without_suppression() {
        let mut t = tracker();
        let mut sink = VecSink::default();

        let prompt = AppOpenResponse {
            freeze_prompt_required: true,
            message: "Streak at risk".to_string(),
            ..Default::default()
        };
        let g = t.begin_refresh();
        t.apply_app_open(g, prompt.clone(), &mut sink);
        assert!(t.streak_decision_required());

        // "Later": local block clears, nothing sent to the backend.
        let msg = t
            .submit_streak_decision(StreakDecision::Later, &mut sink)
            .await
            .expect("later never fails");
        assert!(msg.is_none());
        assert!(!t.streak_decision_required());

        // Next qualifying open re-prompts; no local suppression exists.
        let g = t.begin_refresh();
        t.apply_app_open(g, prompt, &mut sink);
        assert!(t.streak_decision_required());
    }

    #[test]
    fn test_streak_reset_event() {
        let mut t = tracker();
        let mut sink = VecSink::default();

        let resp = AppOpenResponse {
            streak_reset: true,
            message: "Your streak was reset".to_string(),
            ..Default::default()
        };
        let g = t.begin_refresh();
        t.apply_app_open(g, resp, &mut sink);

        assert!(sink.0.contains(&EngagementEvent::StreakReset {
            message: "Your streak was reset".to_string()
        }));
        assert!(!t.streak_decision_required());
    }
}
