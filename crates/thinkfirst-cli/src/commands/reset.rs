use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_json};

#[derive(Subcommand)]
pub enum ResetAction {
    /// Zero today's counter and history entry
    Today,
    /// Wipe usage history, counters, points and the prompt log
    All,
    /// Zero thinking points, totals and level; usage history survives
    Points,
}

pub fn run(action: ResetAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    let state = match action {
        ResetAction::Today => engine.reset_today(),
        ResetAction::All => engine.reset_all(),
        ResetAction::Points => engine.reset_thinking_points(),
    };
    print_json(&json!({
        "today": state.usage.today,
        "week": state.usage.week,
        "month": state.usage.month,
        "thinking_points": state.thinking_points,
        "level": state.gamification.level,
    }))?;
    Ok(())
}
