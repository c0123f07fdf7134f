use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use finfeed::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display balance and transactions
    Dashboard {
        /// Print the normalized feed as JSON
        #[arg(long, conflicts_with = "watch")]
        json: bool,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => finfeed::cli::setup::setup(),
        Some(Commands::Dashboard { json, watch }) => {
            let command = match watch {
                Some(interval_secs) => finfeed::AppCommand::Watch { interval_secs },
                None => finfeed::AppCommand::Dashboard { json },
            };
            finfeed::run_command(command, config_path).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
