use clap::Subcommand;
use serde_json::json;
use thinkfirst_core::storage::config::keyring_store;
use thinkfirst_core::storage::{data_dir, Config};

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the data directory path
    Path,
    /// Store the classifier API key in the OS keyring
    SetApiKey { key: String },
    /// Remove the classifier API key from the OS keyring
    ClearApiKey,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            print_json(&json!({
                "classifier": {
                    "endpoint": config.classifier.endpoint,
                    "model": config.classifier.model,
                    "timeout_secs": config.classifier.timeout_secs,
                    "api_key_configured": config.api_key().is_some(),
                },
                "retention": config.retention,
            }))?;
        }
        ConfigAction::Path => {
            println!("{}", data_dir()?.display());
        }
        ConfigAction::SetApiKey { key } => {
            keyring_store::set("api_key", &key)?;
            println!("API key stored.");
        }
        ConfigAction::ClearApiKey => {
            keyring_store::delete("api_key")?;
            println!("API key removed.");
        }
    }
    Ok(())
}
