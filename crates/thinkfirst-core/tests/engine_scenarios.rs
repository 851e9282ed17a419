//! End-to-end engine flows over an in-memory store.
//!
//! Network-free throughout: strict and relaxed modes never call the remote
//! service, and normal mode with no API key short-circuits to the heuristic
//! before opening a connection.

use thinkfirst_core::{
    Command, CommandOutput, Engine, Event, InterventionKind, MemoryStore, Mode, PromptClassifier,
    RemoteClassifier, RetentionPolicy,
};

fn offline_engine() -> Engine {
    let remote = RemoteClassifier::new(
        "http://127.0.0.1:9/unreachable".to_string(),
        "test-model".to_string(),
        String::new(),
        1,
    );
    Engine::open(
        Box::new(MemoryStore::new()),
        PromptClassifier::new(remote),
        RetentionPolicy::default(),
    )
}

fn state_of(output: CommandOutput) -> thinkfirst_core::AppState {
    match output {
        CommandOutput::State(state) => *state,
        CommandOutput::Analysis(_) => panic!("expected state output"),
    }
}

#[tokio::test]
async fn test_recording_three_prompts_updates_all_counters() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    for _ in 0..3 {
        engine.record_prompt("what is a binary heap", "claude.ai").await;
    }
    let state = state_of(engine.dispatch(Command::GetState).await);
    assert_eq!(state.usage.today, 3);
    assert_eq!(state.usage.week, 3);
    assert_eq!(state.usage.month, 3);
    assert_eq!(state.prompt_log.len(), 3);
    assert_eq!(state.last_prompt, "what is a binary heap");
}

#[tokio::test]
async fn test_strict_mode_intervenes_on_every_prompt() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Strict);
    engine
        .record_prompt("help me understand lifetimes", "claude.ai")
        .await;

    let events = engine.take_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::InterventionRequired { kind, analysis, .. } => {
            assert_eq!(*kind, InterventionKind::Strict);
            assert!(!analysis.is_lazy);
            assert!(!analysis.is_learning);
            assert!(analysis.reason.contains("strict mode"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    // Strict mode awards nothing.
    assert_eq!(engine.state().thinking_points, 0);
}

#[tokio::test]
async fn test_relaxed_mode_awards_learning_points_without_intervening() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    engine
        .record_prompt("help me understand borrow checking", "chat.openai.com")
        .await;

    let state = engine.state().clone();
    assert_eq!(state.thinking_points, 2);
    assert_eq!(state.gamification.total_points, 2);

    let events = engine.take_events();
    assert!(events
        .iter()
        .all(|e| !matches!(e, Event::InterventionRequired { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::PointsEarned { points: 2, .. })));
}

#[tokio::test]
async fn test_normal_mode_without_key_falls_back_and_intervenes_on_lazy() {
    let mut engine = offline_engine();
    engine
        .record_prompt("solve this homework problem", "gemini.google.com")
        .await;

    let events = engine.take_events();
    let intervention = events
        .iter()
        .find_map(|e| match e {
            Event::InterventionRequired { kind, analysis, .. } => Some((kind, analysis)),
            _ => None,
        })
        .expect("lazy prompt should trigger an intervention");
    assert_eq!(*intervention.0, InterventionKind::Lazy);
    assert!(intervention.1.is_lazy);
    assert!(intervention.1.suggested_prompt.is_none());
}

#[tokio::test]
async fn test_normal_mode_lets_neutral_prompts_through() {
    let mut engine = offline_engine();
    engine
        .record_prompt("what timezone is Tokyo in", "claude.ai")
        .await;
    assert!(engine.take_events().is_empty());
}

#[tokio::test]
async fn test_prompt_log_stays_bounded() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    for i in 0..105 {
        engine
            .record_prompt(&format!("neutral prompt {i}"), "claude.ai")
            .await;
    }
    let state = engine.state();
    assert_eq!(state.prompt_log.len(), 100);
    // Oldest dropped first.
    assert_eq!(state.prompt_log[0].prompt, "neutral prompt 5");
    assert_eq!(state.usage.today, 105);
}

#[tokio::test]
async fn test_points_clamp_at_zero_through_the_command_interface() {
    let mut engine = offline_engine();
    let state = state_of(
        engine
            .dispatch(Command::AdjustThinkingPoints { delta: -1 })
            .await,
    );
    assert_eq!(state.thinking_points, 0);
    assert_eq!(state.gamification.total_points, 0);
    assert!(engine.take_events().is_empty());
}

#[tokio::test]
async fn test_level_up_emits_an_event() {
    let mut engine = offline_engine();
    let state = state_of(
        engine
            .dispatch(Command::AdjustThinkingPoints { delta: 100 })
            .await,
    );
    assert_eq!(state.gamification.level, 2);
    let events = engine.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::LevelUp { level: 2, .. })));
}

#[tokio::test]
async fn test_daily_goal_is_clamped_to_at_least_one() {
    let mut engine = offline_engine();
    let state = state_of(engine.dispatch(Command::SetDailyGoal { goal: 0 }).await);
    assert_eq!(state.gamification.daily_goal, 1);
}

#[tokio::test]
async fn test_reset_today_through_the_command_interface() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    for _ in 0..4 {
        engine.record_prompt("neutral", "claude.ai").await;
    }
    let state = state_of(engine.dispatch(Command::ResetToday).await);
    assert_eq!(state.usage.today, 0);
    assert_eq!(state.usage.week, 0);
    assert_eq!(state.usage.month, 0);
}

#[tokio::test]
async fn test_reset_all_wipes_counters_points_and_log() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    engine
        .record_prompt("help me understand traits", "claude.ai")
        .await;
    engine.adjust_thinking_points(10);

    let state = state_of(engine.dispatch(Command::ResetAll).await);
    assert_eq!(state.usage.today, 0);
    assert_eq!(state.thinking_points, 0);
    assert_eq!(state.gamification.total_points, 0);
    assert!(state.prompt_log.is_empty());
    assert_eq!(state.mode, Mode::Relaxed);
}

#[tokio::test]
async fn test_classify_command_returns_an_analysis() {
    let mut engine = offline_engine();
    engine.set_mode(Mode::Relaxed);
    let output = engine
        .dispatch(Command::Classify {
            text: "explain the concept of ownership".to_string(),
        })
        .await;
    match output {
        CommandOutput::Analysis(analysis) => {
            assert!(analysis.is_learning);
            assert!(!analysis.is_lazy);
        }
        CommandOutput::State(_) => panic!("expected analysis output"),
    }
    // The heuristic verdict awards learning points as a side effect.
    assert_eq!(engine.state().thinking_points, 2);
}

#[tokio::test]
async fn test_state_survives_a_reopen() {
    let store = std::sync::Arc::new(MemoryStore::new());

    struct SharedStore(std::sync::Arc<MemoryStore>);
    impl thinkfirst_core::StateStore for SharedStore {
        fn load(&self) -> Result<Option<serde_json::Value>, thinkfirst_core::StorageError> {
            self.0.load()
        }
        fn save(
            &self,
            state: &thinkfirst_core::AppState,
        ) -> Result<(), thinkfirst_core::StorageError> {
            self.0.save(state)
        }
    }

    let classifier = || {
        PromptClassifier::new(RemoteClassifier::new(
            "http://127.0.0.1:9/unreachable".to_string(),
            "test-model".to_string(),
            String::new(),
            1,
        ))
    };

    let mut engine = Engine::open(
        Box::new(SharedStore(store.clone())),
        classifier(),
        RetentionPolicy::default(),
    );
    engine.set_mode(Mode::Strict);
    engine.record_prompt("first", "claude.ai").await;
    drop(engine);

    let mut reopened = Engine::open(
        Box::new(SharedStore(store)),
        classifier(),
        RetentionPolicy::default(),
    );
    let state = reopened.state();
    assert_eq!(state.mode, Mode::Strict);
    assert_eq!(state.usage.today, 1);
    assert_eq!(state.prompt_log.len(), 1);
}
