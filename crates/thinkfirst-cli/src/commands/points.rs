use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_events, print_json};

#[derive(Subcommand)]
pub enum PointsAction {
    /// Show the current balance and level
    Show,
    /// Adjust the balance by a signed delta (floored at zero)
    Adjust {
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

pub fn run(action: PointsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        PointsAction::Show => {
            let state = engine.state();
            print_json(&json!({
                "thinking_points": state.thinking_points,
                "total_points": state.gamification.total_points,
                "level": state.gamification.level,
            }))?;
        }
        PointsAction::Adjust { delta } => {
            let state = engine.adjust_thinking_points(delta).clone();
            print_json(&json!({
                "thinking_points": state.thinking_points,
                "total_points": state.gamification.total_points,
                "level": state.gamification.level,
            }))?;
            print_events(&mut engine);
        }
    }
    Ok(())
}
