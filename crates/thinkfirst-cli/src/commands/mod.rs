pub mod classify;
pub mod config;
pub mod goal;
pub mod mode;
pub mod points;
pub mod record;
pub mod reset;
pub mod stats;

use thinkfirst_core::storage::Config;
use thinkfirst_core::{Engine, JsonFileStore, PromptClassifier, RemoteClassifier};

/// Build the engine the way every command does: config from disk, state from
/// the default store, classifier wired from the resolved key (no key means
/// heuristic-only).
pub fn open_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let remote = RemoteClassifier::new(
        config.classifier.endpoint.clone(),
        config.classifier.model.clone(),
        config.api_key().unwrap_or_default(),
        config.classifier.timeout_secs,
    );
    let store = JsonFileStore::open_default()?;
    Ok(Engine::open(
        Box::new(store),
        PromptClassifier::new(remote),
        config.retention.clone(),
    ))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print queued notifications as JSON lines on stderr, so they don't mix
/// with command output.
pub fn print_events(engine: &mut Engine) {
    for event in engine.take_events() {
        if let Ok(line) = serde_json::to_string(&event) {
            eprintln!("{line}");
        }
    }
}
