use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Counter summary (today / rolling week / month)
    Summary,
    /// Daily history series
    History,
    /// Recent prompt log
    Log,
    /// Full state dump
    State,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let state = engine.state().clone();

    match action {
        StatsAction::Summary => {
            let summary = json!({
                "today": state.usage.today,
                "week": state.usage.week,
                "month": state.usage.month,
                "thinking_points": state.thinking_points,
                "level": state.gamification.level,
                "current_streak": state.gamification.current_streak,
                "longest_streak": state.gamification.longest_streak,
                "mode": state.mode,
            });
            print_json(&summary)?;
        }
        StatsAction::History => {
            print_json(&state.usage.history)?;
        }
        StatsAction::Log => {
            print_json(&state.prompt_log)?;
        }
        StatsAction::State => {
            print_json(&state)?;
        }
    }
    Ok(())
}
