//! Command dispatch over the authoritative state.
//!
//! One [`Engine`] per process owns the single in-memory [`AppState`] copy,
//! persists the full blob after every mutation, and queues [`Event`]s for
//! the embedding surface to drain. Handlers run to completion one at a time;
//! the only suspension points are persistence and the remote classification
//! call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::{PromptAnalysis, PromptClassifier, Verdict, VerdictSource};
use crate::events::{Event, InterventionKind};
use crate::gamification::LEARNING_AWARD;
use crate::history::RetentionPolicy;
use crate::state::{AppState, Mode, PromptLogEntry};
use crate::storage::StateStore;

/// Commands the UI layer can issue.
///
/// One closed variant per operation -- dispatch matches exhaustively, so a
/// command that isn't handled does not compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    GetState,
    SetMode { mode: Mode },
    SetDailyGoal { goal: u32 },
    AdjustThinkingPoints { delta: i32 },
    RecordPrompt { text: String, site: String },
    ResetToday,
    ResetAll,
    Classify { text: String },
}

/// What a command returns: the full updated state, or an analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    State(Box<AppState>),
    Analysis(PromptAnalysis),
}

/// The stateful core. See the module docs for the ownership model.
pub struct Engine {
    store: Box<dyn StateStore>,
    classifier: PromptClassifier,
    retention: RetentionPolicy,
    state: AppState,
    events: Vec<Event>,
}

impl Engine {
    /// Load persisted state -- merging defaults over whatever is there --
    /// and reconcile it up to the current instant.
    ///
    /// A missing or corrupted blob starts from defaults; nothing here is
    /// fatal.
    pub fn open(
        store: Box<dyn StateStore>,
        classifier: PromptClassifier,
        retention: RetentionPolicy,
    ) -> Self {
        let now = Utc::now();
        let state = match store.load() {
            Ok(Some(raw)) => AppState::from_value(raw, now),
            Ok(None) => AppState::new(now),
            Err(e) => {
                warn!(error = %e, "failed to load persisted state; starting from defaults");
                AppState::new(now)
            }
        };
        let mut engine = Self {
            store,
            classifier,
            retention,
            state,
            events: Vec::new(),
        };
        engine.state.sanitize(now, &engine.retention);
        engine.state.usage.reconcile_rollovers(now, &engine.retention);
        engine.persist();
        engine
    }

    /// Route one command. Network is only touched by `RecordPrompt` (in
    /// normal mode) and `Classify`.
    pub async fn dispatch(&mut self, command: Command) -> CommandOutput {
        match command {
            Command::GetState => CommandOutput::State(Box::new(self.state().clone())),
            Command::SetMode { mode } => CommandOutput::State(Box::new(self.set_mode(mode).clone())),
            Command::SetDailyGoal { goal } => {
                CommandOutput::State(Box::new(self.set_daily_goal(goal).clone()))
            }
            Command::AdjustThinkingPoints { delta } => {
                CommandOutput::State(Box::new(self.adjust_thinking_points(delta).clone()))
            }
            Command::RecordPrompt { text, site } => {
                CommandOutput::State(Box::new(self.record_prompt(&text, &site).await.clone()))
            }
            Command::ResetToday => CommandOutput::State(Box::new(self.reset_today().clone())),
            Command::ResetAll => CommandOutput::State(Box::new(self.reset_all().clone())),
            Command::Classify { text } => CommandOutput::Analysis(self.classify(&text).await),
        }
    }

    /// Current state, reconciled up to now.
    pub fn state(&mut self) -> &AppState {
        let now = Utc::now();
        self.state.usage.reconcile_rollovers(now, &self.retention);
        self.persist();
        &self.state
    }

    pub fn set_mode(&mut self, mode: Mode) -> &AppState {
        self.state.mode = mode;
        self.persist();
        &self.state
    }

    pub fn set_daily_goal(&mut self, goal: u32) -> &AppState {
        self.state.gamification.daily_goal = goal.max(1);
        self.persist();
        &self.state
    }

    pub fn adjust_thinking_points(&mut self, delta: i32) -> &AppState {
        let now = Utc::now();
        self.apply_points(delta, now);
        self.persist();
        &self.state
    }

    /// The hot path: account for a detected submission, then decide whether
    /// the intervention UI needs to fire.
    ///
    /// Accounting always happens, whatever the mode; classification and
    /// point awards are mode-dependent.
    pub async fn record_prompt(&mut self, text: &str, site: &str) -> &AppState {
        let now = Utc::now();
        self.state.usage.record(now, &self.retention);
        self.state.last_prompt = text.to_string();
        let entry = PromptLogEntry {
            prompt: text.to_string(),
            site: site.to_string(),
            timestamp: now,
            mode: self.state.mode,
        };
        self.state.push_prompt_log(entry, &self.retention);
        self.persist();

        match self.state.mode {
            Mode::Strict => {
                let verdict = self.classifier.classify(Mode::Strict, text).await;
                self.events.push(Event::InterventionRequired {
                    kind: InterventionKind::Strict,
                    prompt: text.to_string(),
                    analysis: verdict.analysis,
                    at: now,
                });
            }
            Mode::Relaxed => {
                // Tracking only: the heuristic runs to hand out learning
                // points, never to block.
                let verdict = self.classifier.classify(Mode::Relaxed, text).await;
                self.award_learning(&verdict, now);
            }
            Mode::Normal => {
                let verdict = self.classifier.classify(Mode::Normal, text).await;
                self.award_learning(&verdict, now);
                if verdict.analysis.is_lazy {
                    self.events.push(Event::InterventionRequired {
                        kind: InterventionKind::Lazy,
                        prompt: text.to_string(),
                        analysis: verdict.analysis,
                        at: now,
                    });
                }
            }
        }
        self.persist();
        &self.state
    }

    /// Analyze text without recording a submission.
    pub async fn classify(&mut self, text: &str) -> PromptAnalysis {
        let now = Utc::now();
        let verdict = self.classifier.classify(self.state.mode, text).await;
        self.award_learning(&verdict, now);
        self.persist();
        verdict.analysis
    }

    pub fn reset_today(&mut self) -> &AppState {
        let now = Utc::now();
        self.state.usage.reconcile_rollovers(now, &self.retention);
        self.state.usage.reset_today(now, &self.retention);
        self.persist();
        &self.state
    }

    pub fn reset_all(&mut self) -> &AppState {
        let now = Utc::now();
        self.state.reset_all(now);
        self.persist();
        &self.state
    }

    /// The settings surface's "reset thinking points" action. Not part of
    /// the command set; usage history survives.
    pub fn reset_thinking_points(&mut self) -> &AppState {
        self.state.reset_thinking_points();
        self.persist();
        &self.state
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn award_learning(&mut self, verdict: &Verdict, now: DateTime<Utc>) {
        if verdict.source == VerdictSource::Heuristic && verdict.analysis.is_learning {
            self.apply_points(LEARNING_AWARD, now);
        }
    }

    fn apply_points(&mut self, delta: i32, now: DateTime<Utc>) {
        let balance = self.state.thinking_points;
        let outcome =
            self.state
                .gamification
                .adjust_points(balance, delta, now, &self.retention);
        self.state.thinking_points = outcome.balance;
        if outcome.applied > 0 {
            self.events.push(Event::PointsEarned {
                points: outcome.applied as u32,
                balance: outcome.balance,
                at: now,
            });
        }
        if let Some(level) = outcome.new_level {
            self.events.push(Event::LevelUp { level, at: now });
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!(error = %e, "failed to persist state");
        }
    }
}
