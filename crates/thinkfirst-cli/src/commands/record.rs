use clap::Args;
use serde_json::json;

use super::{open_engine, print_events, print_json};

#[derive(Args)]
pub struct RecordArgs {
    /// The prompt text as submitted
    pub text: String,
    /// Site the prompt was submitted on
    #[arg(long, default_value = "cli")]
    pub site: String,
}

pub async fn run(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let state = engine.record_prompt(&args.text, &args.site).await.clone();
    print_json(&json!({
        "today": state.usage.today,
        "week": state.usage.week,
        "month": state.usage.month,
        "thinking_points": state.thinking_points,
    }))?;
    print_events(&mut engine);
    Ok(())
}
