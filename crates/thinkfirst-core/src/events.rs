use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::PromptAnalysis;

/// Why an intervention fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionKind {
    /// Strict mode: every submission requires reflection.
    Strict,
    /// Normal mode flagged the prompt as lazy.
    Lazy,
}

/// Fire-and-forget notifications toward the UI layer.
/// The embedding surface drains these after each command; nothing in the
/// core waits on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Total points crossed a level threshold upwards.
    LevelUp { level: u32, at: DateTime<Utc> },
    /// A submitted prompt needs user reflection before it goes through.
    InterventionRequired {
        kind: InterventionKind,
        prompt: String,
        analysis: PromptAnalysis,
        at: DateTime<Utc>,
    },
    /// Thinking points were earned (positive applied adjustments only).
    PointsEarned {
        points: u32,
        balance: u32,
        at: DateTime<Utc>,
    },
}
