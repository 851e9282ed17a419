//! Usage accounting: rolling history plus derived counters.
//!
//! The daily series is the source of truth. `today`, `week` and `month` are
//! caches re-derived from it after every mutation -- two independently
//! incremented counters over the same events drift apart, and the drift is
//! visible in the UI.
//!
//! `week` is a trailing 7-local-day window, not an ISO week number. ISO
//! boundaries reset the count mid-week, which users read as lost data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datekey;
use crate::history::{HistorySeries, RetentionPolicy};

/// Days covered by the rolling week window, today inclusive.
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// The bounded per-bucket series backing the derived counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageHistory {
    #[serde(default)]
    pub daily: HistorySeries,
    #[serde(default)]
    pub monthly: HistorySeries,
}

/// When each counter family last crossed its calendar boundary.
///
/// Only the daily stamp drives behavior (gap backfill); the weekly and
/// monthly stamps are bookkeeping carried over from the original schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetStamps {
    pub daily: DateTime<Utc>,
    pub weekly: DateTime<Utc>,
    pub monthly: DateTime<Utc>,
}

impl ResetStamps {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            daily: now,
            weekly: now,
            monthly: now,
        }
    }
}

impl Default for ResetStamps {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

/// Usage counters and their backing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    #[serde(default)]
    pub today: u32,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub history: UsageHistory,
    #[serde(default)]
    pub last_reset: ResetStamps,
}

impl Default for UsageState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl UsageState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            today: 0,
            week: 0,
            month: 0,
            history: UsageHistory::default(),
            last_reset: ResetStamps::at(now),
        }
    }

    /// Record one prompt submission at `now`.
    pub fn record(&mut self, now: DateTime<Utc>, retention: &RetentionPolicy) {
        self.reconcile_rollovers(now, retention);
        let day = datekey::local_day_key(now);
        let month = datekey::local_month_key(now);
        self.history.daily.upsert(&day, 1, retention.daily_days);
        self.history.monthly.upsert(&month, 1, retention.monthly_months);
        self.recompute_derived(now);
    }

    /// Bring the state up to `now`: backfill days the process slept through,
    /// make sure a bucket exists for the current day, re-derive the scalar
    /// counters.
    ///
    /// Idempotent -- safe to call before every read or write.
    pub fn reconcile_rollovers(&mut self, now: DateTime<Utc>, retention: &RetentionPolicy) {
        let today = datekey::local_date(now);
        let today_key = datekey::day_key(today);
        let last_daily = datekey::local_date(self.last_reset.daily);

        if today_key != datekey::day_key(last_daily) {
            let skipped = datekey::days_between(last_daily, today);
            debug!(
                from = %datekey::day_key(last_daily),
                to = %today_key,
                skipped,
                "daily rollover"
            );
            if skipped > 1 {
                self.history.daily.fill_gaps(last_daily, today);
            }
            if self.history.daily.contains(&today_key) {
                // An entry for a day we supposedly never saw: the clock moved
                // backwards or a fixture replayed. Start the day over.
                self.history.daily.set(&today_key, 0);
            } else {
                self.history.daily.upsert(&today_key, 0, retention.daily_days);
            }
            self.history.daily.normalize(retention.daily_days);
            self.last_reset.daily = now;
        }

        if datekey::days_between(datekey::local_date(self.last_reset.weekly), today) >= 7 {
            self.last_reset.weekly = now;
        }
        if datekey::local_month_key(self.last_reset.monthly) != datekey::local_month_key(now) {
            self.last_reset.monthly = now;
        }

        self.recompute_derived(now);
    }

    /// Re-derive `today`, `week` and `month` from the daily series.
    pub fn recompute_derived(&mut self, now: DateTime<Utc>) {
        let today = datekey::local_date(now);
        self.today = self.history.daily.count_for(&datekey::day_key(today));
        self.week = self.history.daily.sum_last_days(today, WEEK_WINDOW_DAYS) as u32;
        self.month = self.history.daily.sum_month(&datekey::local_month_key(now)) as u32;
    }

    /// Zero the current day without touching other days.
    ///
    /// The month scalar is re-derived rather than decremented. The monthly
    /// archive entry is the one thing that cannot be re-derived (its daily
    /// entries age out of the 30-day window), so it alone takes a clamped
    /// subtraction of the zeroed amount.
    pub fn reset_today(&mut self, now: DateTime<Utc>, retention: &RetentionPolicy) {
        let today_key = datekey::local_day_key(now);
        let zeroed = self.history.daily.count_for(&today_key);
        if zeroed > 0 {
            self.history.daily.set(&today_key, 0);
            self.history.monthly.upsert(
                &datekey::local_month_key(now),
                -(zeroed as i64),
                retention.monthly_months,
            );
        }
        self.recompute_derived(now);
    }
}
