pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{CurrencyFormatter, FeedSynchronizer, RecordNormalizer};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    /// Sync once and print the dashboard, or the snapshot as JSON
    Dashboard { json: bool },
    /// Re-sync on an interval until interrupted
    Watch { interval_secs: u64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Finance feed starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let formatter = CurrencyFormatter::new(config.currency.clone());
    let source = providers::ApiTransactionSource::new(&config.api.base_url, config.api.timeout())?;
    let synchronizer = Arc::new(FeedSynchronizer::new(
        Arc::new(source),
        RecordNormalizer::new(formatter.clone()),
    ));

    match command {
        AppCommand::Dashboard { json } => {
            cli::dashboard::run(&synchronizer, &formatter, json).await
        }
        AppCommand::Watch { interval_secs } => {
            if interval_secs == 0 {
                anyhow::bail!("Watch interval must be at least one second");
            }
            cli::dashboard::watch(
                synchronizer,
                &formatter,
                Duration::from_secs(interval_secs),
            )
            .await
        }
    }
}
