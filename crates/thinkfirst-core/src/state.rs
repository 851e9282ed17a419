//! The persisted state blob.
//!
//! One JSON document holds everything: mode, usage history, gamification and
//! the prompt log. It is loaded once at startup, mutated in place by the
//! engine, and written back after every mutation. Loading merges defaults
//! field by field, so a blob written by an older schema keeps what it has and
//! backfills the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::datekey;
use crate::gamification::{GamificationState, POINTS_PER_LEVEL};
use crate::history::RetentionPolicy;
use crate::usage::UsageState;

/// Current persisted-schema version. The original shipped without one;
/// a blob with no version field merges as version 0.
pub const SCHEMA_VERSION: u32 = 1;

/// Intervention mode, process-wide and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Track usage only; never intervene.
    Relaxed,
    /// Intervene on lazy prompts.
    Normal,
    /// Intervene on every prompt.
    Strict,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal
    }
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Relaxed => "relaxed",
            Mode::Normal => "normal",
            Mode::Strict => "strict",
        }
    }

    /// Human-readable description for settings surfaces.
    pub fn description(&self) -> &'static str {
        match self {
            Mode::Relaxed => {
                "Relaxed mode only tracks your AI usage without any interventions. \
                 Use this mode when you want to monitor your usage patterns."
            }
            Mode::Normal => {
                "Normal mode will intervene when it detects lazy prompts like \
                 \"solve this for me\" or \"write code for this\". It encourages \
                 you to think before asking AI for help."
            }
            Mode::Strict => {
                "Strict mode intervenes on all AI usage, encouraging you to think \
                 through problems thoroughly before consulting AI. Best for \
                 learning and skill development."
            }
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relaxed" => Ok(Mode::Relaxed),
            "normal" => Ok(Mode::Normal),
            "strict" => Ok(Mode::Strict),
            other => Err(format!(
                "unknown mode '{other}' (expected relaxed, normal or strict)"
            )),
        }
    }
}

/// One recorded prompt submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub prompt: String,
    pub site: String,
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
}

/// The full persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_ai_sites")]
    pub ai_sites: Vec<String>,
    #[serde(default)]
    pub usage: UsageState,
    #[serde(default)]
    pub gamification: GamificationState,
    #[serde(default)]
    pub prompt_log: Vec<PromptLogEntry>,
    #[serde(default)]
    pub thinking_points: u32,
    #[serde(default)]
    pub last_prompt: String,
}

fn default_ai_sites() -> Vec<String> {
    [
        "chat.openai.com",
        "claude.ai",
        "gemini.google.com",
        "x.ai",
        "deepseek.ai",
        "copilot.microsoft.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl AppState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            mode: Mode::default(),
            ai_sites: default_ai_sites(),
            usage: UsageState::new(now),
            gamification: GamificationState::default(),
            prompt_log: Vec::new(),
            thinking_points: 0,
            last_prompt: String::new(),
        }
    }

    /// Merge a raw persisted blob over defaults, field by field.
    ///
    /// A top-level field that is missing or fails to deserialize keeps its
    /// default; real data in the other fields is never discarded because one
    /// field went bad. Nested structs backfill their own missing fields via
    /// serde defaults.
    pub fn from_value(value: serde_json::Value, now: DateTime<Utc>) -> Self {
        let mut state = AppState::new(now);
        let serde_json::Value::Object(map) = value else {
            warn!("persisted state is not an object; starting from defaults");
            return state;
        };

        fn merge<T: serde::de::DeserializeOwned>(
            map: &serde_json::Map<String, serde_json::Value>,
            key: &str,
            slot: &mut T,
        ) {
            if let Some(raw) = map.get(key) {
                match serde_json::from_value(raw.clone()) {
                    Ok(v) => *slot = v,
                    Err(e) => warn!(field = key, error = %e, "dropping malformed state field"),
                }
            }
        }

        merge(&map, "mode", &mut state.mode);
        merge(&map, "ai_sites", &mut state.ai_sites);
        merge(&map, "usage", &mut state.usage);
        merge(&map, "gamification", &mut state.gamification);
        merge(&map, "prompt_log", &mut state.prompt_log);
        merge(&map, "thinking_points", &mut state.thinking_points);
        merge(&map, "last_prompt", &mut state.last_prompt);
        state.schema_version = SCHEMA_VERSION;
        state
    }

    /// Post-load repair.
    ///
    /// Malformed bucket keys are re-bucketed onto the current day/month
    /// (history counts survive corruption of their labels), series are
    /// re-sorted and deduplicated, bounded collections re-trimmed, and the
    /// scalar counters re-derived -- history is the source of truth, the
    /// scalars are a cache.
    pub fn sanitize(&mut self, now: DateTime<Utc>, retention: &RetentionPolicy) {
        let today_key = datekey::local_day_key(now);
        let month_key = datekey::local_month_key(now);

        let moved = self
            .usage
            .history
            .daily
            .rebucket_where(|b| datekey::parse_day_key(b).is_ok(), &today_key);
        if moved > 0 {
            warn!(moved, "re-bucketed malformed daily history entries onto the current day");
        }
        let moved = self
            .usage
            .history
            .monthly
            .rebucket_where(|b| datekey::parse_day_key(&format!("{b}-01")).is_ok(), &month_key);
        if moved > 0 {
            warn!(moved, "re-bucketed malformed monthly history entries onto the current month");
        }
        self.usage.history.daily.normalize(retention.daily_days);
        self.usage.history.monthly.normalize(retention.monthly_months);

        self.gamification
            .daily_progress
            .retain(|d| datekey::parse_day_key(&d.date).is_ok());
        if self.gamification.daily_progress.len() > retention.daily_progress {
            let excess = self.gamification.daily_progress.len() - retention.daily_progress;
            self.gamification.daily_progress.drain(..excess);
        }
        if self.prompt_log.len() > retention.prompt_log {
            let excess = self.prompt_log.len() - retention.prompt_log;
            self.prompt_log.drain(..excess);
        }

        self.gamification.level = self.gamification.total_points / POINTS_PER_LEVEL + 1;
        self.usage.recompute_derived(now);
    }

    /// Whether `host` belongs to a monitored AI chat site.
    pub fn is_monitored_site(&self, host: &str) -> bool {
        self.ai_sites.iter().any(|s| host.contains(s.as_str()))
    }

    /// Append to the prompt log, dropping the oldest entries beyond the
    /// retention limit.
    pub fn push_prompt_log(&mut self, entry: PromptLogEntry, retention: &RetentionPolicy) {
        self.prompt_log.push(entry);
        if self.prompt_log.len() > retention.prompt_log {
            let excess = self.prompt_log.len() - retention.prompt_log;
            self.prompt_log.drain(..excess);
        }
    }

    /// Full wipe: usage, gamification, points and the prompt log all return
    /// to defaults; reset stamps move to `now`. Mode and the site list
    /// survive.
    pub fn reset_all(&mut self, now: DateTime<Utc>) {
        self.usage = UsageState::new(now);
        self.gamification = GamificationState::default();
        self.thinking_points = 0;
        self.prompt_log.clear();
        self.last_prompt.clear();
    }

    /// Zero the points side only: balance, totals, level, daily progress.
    /// Usage history and streaks survive.
    pub fn reset_thinking_points(&mut self) {
        self.thinking_points = 0;
        self.gamification.reset_points();
    }
}
