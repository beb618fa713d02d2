//! Day-key normalization.
//!
//! The backend records when a meal/workout/check-in was logged as a loose
//! "date token": sometimes a literal word ("today"), sometimes a relative
//! phrase ("2 days ago"), sometimes ISO-8601, sometimes a bare `YYYY-MM-DD`.
//! Everything that groups events by day goes through [`normalize`], which maps
//! all of those onto a canonical [`DayKey`] in the device-local calendar.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical calendar-day identifier (`YYYY-MM-DD`, local calendar).
///
/// Two timestamps that fall on the same local calendar day normalize to equal
/// keys. Ordering follows the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's key from the device-local clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// The key of the local calendar day containing `dt`.
    pub fn from_datetime(dt: DateTime<Local>) -> Self {
        Self(dt.date_naive())
    }

    /// Strict `YYYY-MM-DD` parse. Anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

// Compile-once relative-phrase pattern via OnceLock.
fn re_relative() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap())
}

/// Normalize a raw date token to a day key, or `None` if unparseable.
///
/// Rules are tried in order; the first match wins:
/// 1. Literal keywords: "today", "now", "yesterday" (case-insensitive).
/// 2. Relative phrases: "N days ago", "N weeks ago".
/// 3. ISO-8601: RFC 3339 with offset (converted to the local calendar), then
///    a naive `YYYY-MM-DDTHH:MM:SS` timestamp taken as local time.
/// 4. Strict `YYYY-MM-DD`.
///
/// `now` is injected so callers group against a stable "today" and tests stay
/// deterministic. Unparseable tokens are the caller's problem to skip, never
/// an error.
pub fn normalize(token: &str, now: DateTime<Local>) -> Option<DayKey> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let lower = token.to_lowercase();
    match lower.as_str() {
        "today" | "now" => return Some(DayKey::from_datetime(now)),
        "yesterday" => return Some(DayKey::new(now.date_naive() - Duration::days(1))),
        _ => {}
    }

    if let Some(caps) = re_relative().captures(&lower) {
        let n: i64 = caps[1].parse().ok()?;
        let days = match &caps[2] {
            "week" => n.checked_mul(7)?,
            _ => n,
        };
        return now
            .date_naive()
            .checked_sub_signed(Duration::days(days))
            .map(DayKey::new);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(DayKey::new(dt.with_timezone(&now.timezone()).date_naive()));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(DayKey::new(ndt.date()));
    }

    DayKey::parse(token)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
