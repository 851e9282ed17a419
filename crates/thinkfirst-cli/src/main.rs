use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "thinkfirst-cli", version, about = "ThinkFirst CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Usage statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Intervention mode
    Mode {
        #[command(subcommand)]
        action: commands::mode::ModeAction,
    },
    /// Daily goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Thinking points
    Points {
        #[command(subcommand)]
        action: commands::points::PointsAction,
    },
    /// Record a detected prompt submission
    Record(commands::record::RecordArgs),
    /// Classify a prompt without recording it
    Classify(commands::classify::ClassifyArgs),
    /// Reset counters and points
    Reset {
        #[command(subcommand)]
        action: commands::reset::ResetAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Mode { action } => commands::mode::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Points { action } => commands::points::run(action),
        Commands::Record(args) => commands::record::run(args).await,
        Commands::Classify(args) => commands::classify::run(args).await,
        Commands::Reset { action } => commands::reset::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
