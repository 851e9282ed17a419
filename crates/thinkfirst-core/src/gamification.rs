//! Thinking points, daily goals, streaks, levels.
//!
//! Points move by the *applied* delta, never the requested one: the balance
//! floors at 0, and everything downstream (total points, daily progress)
//! keys off what actually changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datekey;
use crate::history::RetentionPolicy;

/// Total points needed per level.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Award when the heuristic classifier sees learning behavior.
pub const LEARNING_AWARD: i32 = 2;

/// Penalty when the user pushes through an intervention anyway.
pub const CONTINUE_PENALTY: i32 = -1;

/// Points earned on one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoints {
    pub date: String,
    pub points: u32,
}

/// Goal, streak and level bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationState {
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_goal_hit: Option<DateTime<Utc>>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub daily_progress: Vec<DailyPoints>,
}

fn default_daily_goal() -> u32 {
    5
}
fn default_level() -> u32 {
    1
}

impl Default for GamificationState {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            current_streak: 0,
            longest_streak: 0,
            last_goal_hit: None,
            level: default_level(),
            total_points: 0,
            daily_progress: Vec::new(),
        }
    }
}

/// What a points adjustment actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsOutcome {
    /// Delta after the floor clamp -- what was really applied.
    pub applied: i32,
    /// New thinking-points balance.
    pub balance: u32,
    /// Set when the adjustment crossed a level threshold upwards.
    pub new_level: Option<u32>,
    /// True the first time today's progress reaches the daily goal.
    pub goal_hit: bool,
}

impl GamificationState {
    /// Apply `delta` to the thinking-points balance `balance`.
    ///
    /// When the balance is 0 and `delta` is -1, nothing is applied: the
    /// returned balance stays 0 and `total_points` does not move either.
    pub fn adjust_points(
        &mut self,
        balance: u32,
        delta: i32,
        now: DateTime<Utc>,
        retention: &RetentionPolicy,
    ) -> PointsOutcome {
        let new_balance = (balance as i64 + delta as i64).max(0) as u32;
        let applied = (new_balance as i64 - balance as i64) as i32;
        self.total_points = (self.total_points as i64 + applied as i64).max(0) as u32;

        let today = datekey::local_day_key(now);
        let progress = match self.daily_progress.iter_mut().find(|d| d.date == today) {
            Some(entry) => {
                entry.points = (entry.points as i64 + applied as i64).max(0) as u32;
                entry.points
            }
            None => {
                let points = applied.max(0) as u32;
                self.daily_progress.push(DailyPoints {
                    date: today,
                    points,
                });
                points
            }
        };
        if self.daily_progress.len() > retention.daily_progress {
            let excess = self.daily_progress.len() - retention.daily_progress;
            self.daily_progress.drain(..excess);
        }

        let goal_hit = self.daily_goal > 0
            && progress >= self.daily_goal
            && self.evaluate_streak(now);

        let recomputed_level = self.total_points / POINTS_PER_LEVEL + 1;
        let new_level = if recomputed_level > self.level {
            self.level = recomputed_level;
            Some(recomputed_level)
        } else {
            self.level = recomputed_level;
            None
        };

        PointsOutcome {
            applied,
            balance: new_balance,
            new_level,
            goal_hit,
        }
    }

    /// Streak bookkeeping, run when today's progress has reached the goal.
    /// Returns false when the goal was already counted today.
    fn evaluate_streak(&mut self, now: DateTime<Utc>) -> bool {
        let today = datekey::local_day_key(now);
        let last_goal_day = self.last_goal_hit.map(datekey::local_day_key);

        let counted = if last_goal_day.as_deref() == Some(datekey::yesterday_key(now).as_str()) {
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);
            true
        } else if last_goal_day.as_deref() != Some(today.as_str()) {
            // Fresh streak, or a broken one restarting.
            self.current_streak = 1;
            true
        } else {
            false
        };
        self.last_goal_hit = Some(now);
        counted
    }

    /// Zero the points side of the state: totals, level and daily progress.
    /// Streak history survives.
    pub fn reset_points(&mut self) {
        self.total_points = 0;
        self.level = default_level();
        self.daily_progress.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn retention() -> RetentionPolicy {
        RetentionPolicy::default()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_negative_delta_clamps_at_zero_balance() {
        let mut gam = GamificationState::default();
        let outcome = gam.adjust_points(0, -1, at(2024, 5, 10), &retention());
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.balance, 0);
        assert_eq!(gam.total_points, 0);
    }

    #[test]
    fn test_partial_clamp_applies_partial_delta() {
        let mut gam = GamificationState::default();
        gam.adjust_points(0, 1, at(2024, 5, 10), &retention());
        let outcome = gam.adjust_points(1, -5, at(2024, 5, 10), &retention());
        assert_eq!(outcome.applied, -1);
        assert_eq!(outcome.balance, 0);
        assert_eq!(gam.total_points, 0);
        assert_eq!(gam.daily_progress[0].points, 0);
    }

    #[test]
    fn test_daily_progress_tracks_applied_points() {
        let mut gam = GamificationState::default();
        gam.adjust_points(0, 2, at(2024, 5, 10), &retention());
        gam.adjust_points(2, 2, at(2024, 5, 10), &retention());
        assert_eq!(gam.daily_progress.len(), 1);
        assert_eq!(gam.daily_progress[0].points, 4);
    }

    #[test]
    fn test_streak_increments_when_last_hit_was_yesterday() {
        let mut gam = GamificationState {
            daily_goal: 5,
            current_streak: 3,
            longest_streak: 3,
            last_goal_hit: Some(at(2024, 5, 9)),
            ..Default::default()
        };
        let outcome = gam.adjust_points(0, 5, at(2024, 5, 10), &retention());
        assert!(outcome.goal_hit);
        assert_eq!(gam.current_streak, 4);
        assert_eq!(gam.longest_streak, 4);
    }

    #[test]
    fn test_streak_is_idempotent_within_a_day() {
        let mut gam = GamificationState {
            daily_goal: 5,
            current_streak: 3,
            longest_streak: 3,
            last_goal_hit: Some(at(2024, 5, 9)),
            ..Default::default()
        };
        gam.adjust_points(0, 5, at(2024, 5, 10), &retention());
        let outcome = gam.adjust_points(5, 5, at(2024, 5, 10), &retention());
        assert!(!outcome.goal_hit);
        assert_eq!(gam.current_streak, 4);
    }

    #[test]
    fn test_broken_streak_restarts_at_one() {
        let mut gam = GamificationState {
            daily_goal: 5,
            current_streak: 6,
            longest_streak: 6,
            last_goal_hit: Some(at(2024, 5, 1)),
            ..Default::default()
        };
        gam.adjust_points(0, 5, at(2024, 5, 10), &retention());
        assert_eq!(gam.current_streak, 1);
        assert_eq!(gam.longest_streak, 6);
    }

    #[test]
    fn test_first_ever_goal_hit_starts_a_streak() {
        let mut gam = GamificationState::default();
        let outcome = gam.adjust_points(0, 5, at(2024, 5, 10), &retention());
        assert!(outcome.goal_hit);
        assert_eq!(gam.current_streak, 1);
        assert!(gam.last_goal_hit.is_some());
    }

    #[test]
    fn test_level_up_at_hundred_points() {
        let mut gam = GamificationState::default();
        let outcome = gam.adjust_points(0, 100, at(2024, 5, 10), &retention());
        assert_eq!(gam.level, 2);
        assert_eq!(outcome.new_level, Some(2));

        // A further small award stays within the level.
        let outcome = gam.adjust_points(100, 1, at(2024, 5, 10), &retention());
        assert_eq!(outcome.new_level, None);
    }

    #[test]
    fn test_daily_progress_stays_bounded() {
        let mut gam = GamificationState::default();
        for d in 1..=31 {
            // One entry per synthetic day key.
            gam.daily_progress.push(DailyPoints {
                date: format!("2024-01-{d:02}"),
                points: 1,
            });
        }
        gam.adjust_points(0, 1, at(2024, 5, 10), &retention());
        assert_eq!(gam.daily_progress.len(), retention().daily_progress);
        // The newest entry survived the trim.
        assert!(gam.daily_progress.iter().any(|d| d.points == 1));
        assert_eq!(gam.daily_progress.last().unwrap().date, datekey::local_day_key(at(2024, 5, 10)));
    }

    #[test]
    fn test_reset_points_keeps_streaks() {
        let mut gam = GamificationState::default();
        gam.adjust_points(0, 120, at(2024, 5, 10), &retention());
        let streak = gam.current_streak;
        gam.reset_points();
        assert_eq!(gam.total_points, 0);
        assert_eq!(gam.level, 1);
        assert!(gam.daily_progress.is_empty());
        assert_eq!(gam.current_streak, streak);
    }
}
