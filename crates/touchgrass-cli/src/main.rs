use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "touchgrass", version, about = "Break reminders that work around your meetings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Reminder grid and work-hours checks
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Suggest a break activity for a described moment
    Suggest(commands::suggest::SuggestArgs),
    /// Run the reminder loop in the foreground, printing events as JSON lines
    Run(commands::run::RunArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOUCHGRASS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Suggest(args) => commands::suggest::run(args),
        Commands::Run(args) => commands::run::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
