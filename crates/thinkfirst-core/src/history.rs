//! Bounded per-bucket count series.
//!
//! A [`HistorySeries`] holds at most one entry per bucket key, sorted
//! ascending, trimmed to a retention limit with the oldest buckets dropped
//! first. The daily series is the source of truth for every derived counter
//! in the usage engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datekey;

/// One bucket's count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub bucket: String,
    pub count: u32,
}

/// Retention limits for every bounded collection in the state blob.
///
/// Limits are configuration, not structure: the series carry no cap of their
/// own, callers pass the policy into mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Daily history entries kept.
    #[serde(default = "default_daily_days")]
    pub daily_days: usize,
    /// Monthly history entries kept.
    #[serde(default = "default_monthly_months")]
    pub monthly_months: usize,
    /// Prompt log entries kept.
    #[serde(default = "default_prompt_log")]
    pub prompt_log: usize,
    /// Daily point-progress entries kept.
    #[serde(default = "default_daily_progress")]
    pub daily_progress: usize,
}

fn default_daily_days() -> usize {
    30
}
fn default_monthly_months() -> usize {
    12
}
fn default_prompt_log() -> usize {
    100
}
fn default_daily_progress() -> usize {
    30
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily_days: default_daily_days(),
            monthly_months: default_monthly_months(),
            prompt_log: default_prompt_log(),
            daily_progress: default_daily_progress(),
        }
    }
}

/// Sorted, deduplicated sequence of [`HistoryEntry`], ascending by bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistorySeries {
    entries: Vec<HistoryEntry>,
}

impl HistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn contains(&self, bucket: &str) -> bool {
        self.entries.iter().any(|e| e.bucket == bucket)
    }

    /// Count for `bucket`, 0 if absent.
    pub fn count_for(&self, bucket: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.bucket == bucket)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    /// Add `delta` to `bucket`'s count, inserting the entry if missing.
    ///
    /// Counts clamp at 0. The series is re-sorted and trimmed to `limit`,
    /// keeping the most recent buckets.
    pub fn upsert(&mut self, bucket: &str, delta: i64, limit: usize) {
        match self.entries.iter_mut().find(|e| e.bucket == bucket) {
            Some(entry) => {
                entry.count = (entry.count as i64 + delta).max(0) as u32;
            }
            None => self.entries.push(HistoryEntry {
                bucket: bucket.to_string(),
                count: delta.max(0) as u32,
            }),
        }
        self.normalize(limit);
    }

    /// Overwrite `bucket`'s count, inserting the entry if missing.
    pub fn set(&mut self, bucket: &str, count: u32) {
        match self.entries.iter_mut().find(|e| e.bucket == bucket) {
            Some(entry) => entry.count = count,
            None => {
                self.entries.push(HistoryEntry {
                    bucket: bucket.to_string(),
                    count,
                });
                self.entries.sort_by(|a, b| a.bucket.cmp(&b.bucket));
            }
        }
    }

    /// Insert zero-count entries for every day strictly between the bounds
    /// that has no entry yet.
    ///
    /// Existing buckets are never overwritten, so running this twice over the
    /// same range is a no-op.
    pub fn fill_gaps(&mut self, from_exclusive: NaiveDate, to_exclusive: NaiveDate) {
        let mut day = from_exclusive;
        loop {
            day = match day.succ_opt() {
                Some(d) => d,
                None => break,
            };
            if day >= to_exclusive {
                break;
            }
            let key = datekey::day_key(day);
            if !self.contains(&key) {
                self.entries.push(HistoryEntry {
                    bucket: key,
                    count: 0,
                });
            }
        }
        self.entries.sort_by(|a, b| a.bucket.cmp(&b.bucket));
    }

    /// Re-sort, merge duplicate buckets, trim the oldest entries beyond
    /// `limit`.
    pub fn normalize(&mut self, limit: usize) {
        self.entries.sort_by(|a, b| a.bucket.cmp(&b.bucket));
        self.entries.dedup_by(|dup, keep| {
            if dup.bucket == keep.bucket {
                keep.count = keep.count.saturating_add(dup.count);
                true
            } else {
                false
            }
        });
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
    }

    /// Relabel entries whose bucket fails `valid` onto `fallback`, returning
    /// how many moved. Recovery path for corrupted blobs; callers normalize
    /// afterwards to merge the relabeled entries.
    pub fn rebucket_where<F: Fn(&str) -> bool>(&mut self, valid: F, fallback: &str) -> usize {
        let mut moved = 0;
        for entry in &mut self.entries {
            if !valid(&entry.bucket) {
                entry.bucket = fallback.to_string();
                moved += 1;
            }
        }
        moved
    }

    /// Sum of counts over entries matching `pred`.
    pub fn sum_where<F: Fn(&HistoryEntry) -> bool>(&self, pred: F) -> u64 {
        self.entries
            .iter()
            .filter(|e| pred(e))
            .map(|e| e.count as u64)
            .sum()
    }

    /// Sum over the trailing `days`-local-day window ending at `today`,
    /// inclusive. Entries whose bucket fails to parse are skipped.
    pub fn sum_last_days(&self, today: NaiveDate, days: i64) -> u64 {
        let from = today - chrono::Duration::days(days - 1);
        self.sum_where(|e| match datekey::parse_day_key(&e.bucket) {
            Ok(d) => d >= from && d <= today,
            Err(_) => false,
        })
    }

    /// Sum over daily entries belonging to `month_key` (prefix match).
    pub fn sum_month(&self, month_key: &str) -> u64 {
        self.sum_where(|e| e.bucket.starts_with(month_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_upsert_inserts_and_accumulates() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-01", 1, 30);
        series.upsert("2024-05-01", 2, 30);
        assert_eq!(series.len(), 1);
        assert_eq!(series.count_for("2024-05-01"), 3);
    }

    #[test]
    fn test_upsert_clamps_at_zero() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-01", -5, 30);
        assert_eq!(series.count_for("2024-05-01"), 0);
        series.upsert("2024-05-01", 3, 30);
        series.upsert("2024-05-01", -10, 30);
        assert_eq!(series.count_for("2024-05-01"), 0);
    }

    #[test]
    fn test_upsert_keeps_ascending_order() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-03", 1, 30);
        series.upsert("2024-05-01", 1, 30);
        series.upsert("2024-05-02", 1, 30);
        let buckets: Vec<&str> = series.entries().iter().map(|e| e.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);
    }

    #[test]
    fn test_trim_drops_oldest_first() {
        let mut series = HistorySeries::new();
        for d in 1..=10 {
            series.upsert(&datekey::day_key(day(2024, 5, d)), 1, 7);
        }
        assert_eq!(series.len(), 7);
        assert_eq!(series.entries()[0].bucket, "2024-05-04");
        assert_eq!(series.entries()[6].bucket, "2024-05-10");
    }

    #[test]
    fn test_fill_gaps_is_exclusive_on_both_ends() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-01", 2, 30);
        series.upsert("2024-05-09", 1, 30);
        series.fill_gaps(day(2024, 5, 1), day(2024, 5, 9));
        assert_eq!(series.len(), 9);
        assert_eq!(series.count_for("2024-05-01"), 2);
        assert_eq!(series.count_for("2024-05-05"), 0);
        assert_eq!(series.count_for("2024-05-09"), 1);
    }

    #[test]
    fn test_fill_gaps_is_idempotent() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-01", 2, 30);
        series.fill_gaps(day(2024, 5, 1), day(2024, 5, 6));
        let once = series.clone();
        series.fill_gaps(day(2024, 5, 1), day(2024, 5, 6));
        assert_eq!(series, once);
    }

    #[test]
    fn test_fill_gaps_never_overwrites() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-03", 4, 30);
        series.fill_gaps(day(2024, 5, 1), day(2024, 5, 6));
        assert_eq!(series.count_for("2024-05-03"), 4);
    }

    #[test]
    fn test_fill_gaps_with_inverted_range_is_a_noop() {
        let mut series = HistorySeries::new();
        series.fill_gaps(day(2024, 5, 9), day(2024, 5, 1));
        assert!(series.is_empty());
    }

    #[test]
    fn test_normalize_merges_duplicates() {
        let mut series = HistorySeries::new();
        series.set("2024-05-01", 2);
        // Simulate a blob that was persisted with a duplicate bucket.
        series.entries.push(HistoryEntry {
            bucket: "2024-05-01".into(),
            count: 3,
        });
        series.normalize(30);
        assert_eq!(series.len(), 1);
        assert_eq!(series.count_for("2024-05-01"), 5);
    }

    #[test]
    fn test_sum_last_days_window() {
        let mut series = HistorySeries::new();
        series.upsert("2024-05-01", 1, 30);
        series.upsert("2024-05-04", 2, 30);
        series.upsert("2024-05-07", 4, 30);
        assert_eq!(series.sum_last_days(day(2024, 5, 7), 7), 7);
        assert_eq!(series.sum_last_days(day(2024, 5, 8), 7), 6);
        assert_eq!(series.sum_last_days(day(2024, 5, 20), 7), 0);
    }

    #[test]
    fn test_sum_last_days_skips_unparseable_buckets() {
        let mut series = HistorySeries::new();
        series.set("garbage", 10);
        series.set("2024-05-07", 1);
        assert_eq!(series.sum_last_days(day(2024, 5, 7), 7), 1);
    }

    #[test]
    fn test_sum_month_prefix_match() {
        let mut series = HistorySeries::new();
        series.upsert("2024-04-30", 5, 30);
        series.upsert("2024-05-01", 1, 30);
        series.upsert("2024-05-20", 2, 30);
        assert_eq!(series.sum_month("2024-05"), 3);
        assert_eq!(series.sum_month("2024-04"), 5);
    }

    #[test]
    fn test_rebucket_where_relabels_invalid() {
        let mut series = HistorySeries::new();
        series.set("not-a-date", 3);
        series.set("2024-05-02", 1);
        let moved = series.rebucket_where(|b| datekey::parse_day_key(b).is_ok(), "2024-05-02");
        assert_eq!(moved, 1);
        series.normalize(30);
        assert_eq!(series.len(), 1);
        assert_eq!(series.count_for("2024-05-02"), 4);
    }
}
