use clap::Args;

use super::{open_engine, print_events, print_json};

#[derive(Args)]
pub struct ClassifyArgs {
    /// The prompt text to analyze
    pub text: String,
}

pub async fn run(args: ClassifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let analysis = engine.classify(&args.text).await;
    print_json(&analysis)?;
    print_events(&mut engine);
    Ok(())
}
