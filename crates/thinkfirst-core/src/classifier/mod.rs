//! Lazy-vs-learning prompt classification.
//!
//! The current [`Mode`] selects the path: `strict` never inspects content
//! (every submission requires reflection), `relaxed` never spends a remote
//! call, `normal` asks the remote service and falls back to the pattern table
//! on any failure.

pub mod heuristic;
pub mod remote;

pub use remote::RemoteClassifier;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::Mode;

/// The fixed verdict reason strict mode attaches to every prompt.
pub const STRICT_MODE_REASON: &str =
    "You are in strict mode. All prompts require reflection before submission.";

/// Classification verdict, in the wire shape the UI consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptAnalysis {
    pub is_lazy: bool,
    pub is_learning: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_prompt: Option<String>,
}

/// Which path produced a verdict.
///
/// Heuristic verdicts are the only ones that award learning points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Strict,
    Heuristic,
    Remote,
}

/// An analysis plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub analysis: PromptAnalysis,
    pub source: VerdictSource,
}

/// Mode-gated classifier over a remote service and the local pattern table.
pub struct PromptClassifier {
    remote: RemoteClassifier,
}

impl PromptClassifier {
    pub fn new(remote: RemoteClassifier) -> Self {
        Self { remote }
    }

    /// Classify `prompt` under `mode`. Never fails: every failure path
    /// degrades to the heuristic.
    pub async fn classify(&self, mode: Mode, prompt: &str) -> Verdict {
        match mode {
            Mode::Strict => Verdict {
                analysis: PromptAnalysis {
                    is_lazy: false,
                    is_learning: false,
                    reason: STRICT_MODE_REASON.to_string(),
                    suggested_prompt: None,
                },
                source: VerdictSource::Strict,
            },
            Mode::Relaxed => Verdict {
                analysis: heuristic::classify(prompt),
                source: VerdictSource::Heuristic,
            },
            Mode::Normal => match self.remote.analyze(prompt).await {
                Ok(mut analysis) => {
                    if analysis.is_lazy {
                        match self.remote.rewrite(prompt).await {
                            Ok(suggestion) => analysis.suggested_prompt = Some(suggestion),
                            Err(e) => {
                                warn!(error = %e, "rewrite request failed; continuing without a suggestion");
                            }
                        }
                    }
                    Verdict {
                        analysis,
                        source: VerdictSource::Remote,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "remote classification failed; using heuristic fallback");
                    Verdict {
                        analysis: heuristic::classify(prompt),
                        source: VerdictSource::Heuristic,
                    }
                }
            },
        }
    }
}
