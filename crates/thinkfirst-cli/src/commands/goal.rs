use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_json};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Show the daily goal and today's progress
    Show,
    /// Set the daily thinking-points goal
    Set { goal: u32 },
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        GoalAction::Show => {
            let state = engine.state();
            let today = thinkfirst_core::datekey::local_day_key(chrono::Utc::now());
            let progress = state
                .gamification
                .daily_progress
                .iter()
                .find(|d| d.date == today)
                .map(|d| d.points)
                .unwrap_or(0);
            print_json(&json!({
                "daily_goal": state.gamification.daily_goal,
                "progress_today": progress,
                "current_streak": state.gamification.current_streak,
                "longest_streak": state.gamification.longest_streak,
            }))?;
        }
        GoalAction::Set { goal } => {
            let state = engine.set_daily_goal(goal);
            print_json(&json!({ "daily_goal": state.gamification.daily_goal }))?;
        }
    }
    Ok(())
}
