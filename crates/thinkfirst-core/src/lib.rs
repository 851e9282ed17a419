//! # ThinkFirst Core Library
//!
//! This library provides the core business logic for ThinkFirst: usage
//! accounting for AI chat prompts over rolling calendar buckets, a
//! thinking-points gamification layer, and lazy-vs-learning prompt
//! classification with a remote service call and a local heuristic fallback.
//! The CLI binary is a thin driver over this library; prompt detection and
//! intervention rendering live in whatever surface embeds it.
//!
//! ## Architecture
//!
//! - **Usage accounting**: bounded daily/monthly history series; the
//!   today/week/month counters are always re-derived from the daily series
//!   (history is the source of truth, the scalars are a cache)
//! - **Gamification**: thinking points, daily goals, goal streaks, levels
//! - **Classifier**: mode-gated remote call with a pattern-table fallback
//! - **Storage**: one JSON state document behind a key-value interface,
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Engine`]: command dispatch over the authoritative state
//! - [`AppState`]: the persisted state blob
//! - [`PromptClassifier`]: lazy-vs-learning classification
//! - [`Config`]: application configuration management

pub mod classifier;
pub mod datekey;
pub mod engine;
pub mod error;
pub mod events;
pub mod gamification;
pub mod history;
pub mod state;
pub mod storage;
pub mod usage;

pub use classifier::{PromptAnalysis, PromptClassifier, RemoteClassifier};
pub use engine::{Command, CommandOutput, Engine};
pub use error::{ClassifyError, ConfigError, CoreError, StorageError};
pub use events::{Event, InterventionKind};
pub use gamification::GamificationState;
pub use history::{HistoryEntry, HistorySeries, RetentionPolicy};
pub use state::{AppState, Mode, PromptLogEntry};
pub use storage::{Config, JsonFileStore, MemoryStore, StateStore};
pub use usage::UsageState;
