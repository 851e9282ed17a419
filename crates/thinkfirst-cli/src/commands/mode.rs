use clap::Subcommand;
use serde_json::json;
use thinkfirst_core::Mode;

use super::{open_engine, print_json};

#[derive(Subcommand)]
pub enum ModeAction {
    /// Show the current mode
    Get,
    /// Set the mode (relaxed, normal, strict)
    Set { mode: String },
}

pub fn run(action: ModeAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        ModeAction::Get => {
            let mode = engine.state().mode;
            print_json(&json!({
                "mode": mode,
                "description": mode.description(),
            }))?;
        }
        ModeAction::Set { mode } => {
            let mode: Mode = mode.parse()?;
            let state = engine.set_mode(mode);
            print_json(&json!({
                "mode": state.mode,
                "description": mode.description(),
            }))?;
        }
    }
    Ok(())
}
