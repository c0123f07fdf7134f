use super::ui;
use crate::core::error::Result as FeedResult;
use crate::core::{CurrencyFormatter, FeedSnapshot, FeedSynchronizer, FeedView, SyncStatus};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LOAD_FAILURE_MESSAGE: &str = "could not load transactions";

impl FeedView {
    pub fn display_as_dashboard(&self, formatter: &CurrencyFormatter) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Transactions", ui::StyleType::Title)
        );

        if let Some(err) = self.error() {
            output.push_str(&ui::style_text(
                &format!("{LOAD_FAILURE_MESSAGE}: {err}"),
                ui::StyleType::Error,
            ));
            output.push_str("\n\n");
        }

        let Some(balance) = self.balance() else {
            if self.error().is_none() {
                output.push_str(&ui::style_text(
                    "No transactions loaded yet",
                    ui::StyleType::Subtle,
                ));
            }
            return output;
        };

        let mut cards = ui::new_styled_table();
        cards.set_header(vec![
            ui::header_cell("Income"),
            ui::header_cell("Outcome"),
            ui::header_cell("Total"),
        ]);
        cards.add_row(vec![
            ui::balance_cell(render_balance("income", balance.formatted_income(formatter)).as_deref()),
            ui::balance_cell(
                render_balance("outcome", balance.formatted_outcome(formatter)).as_deref(),
            ),
            ui::balance_cell(render_balance("total", balance.formatted_total(formatter)).as_deref()),
        ]);
        output.push_str(&cards.to_string());
        output.push_str("\n\n");

        if self.transactions().is_empty() {
            output.push_str(&ui::style_text("No transactions", ui::StyleType::Subtle));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Title"),
            ui::header_cell("Value"),
            ui::header_cell("Category"),
            ui::header_cell("Date"),
        ]);
        for transaction in self.transactions() {
            table.add_row(vec![
                Cell::new(transaction.title()),
                ui::amount_cell(transaction.formatted_value(), transaction.kind()),
                Cell::new(&transaction.category().title),
                Cell::new(transaction.formatted_date()),
            ]);
        }
        output.push_str(&table.to_string());

        output
    }
}

fn render_balance(field: &str, amount: FeedResult<String>) -> Option<String> {
    amount
        .map_err(|e| warn!(field, error = %e, "Could not format balance"))
        .ok()
}

fn print_json(snapshot: &FeedSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .context("Failed to serialize transaction feed")?;
    println!("{json}");
    Ok(())
}

/// Syncs once and prints the dashboard, or the raw snapshot with `json`.
pub async fn run(
    synchronizer: &FeedSynchronizer,
    formatter: &CurrencyFormatter,
    json: bool,
) -> Result<()> {
    let subscription = synchronizer.subscribe();

    let spinner = ui::new_spinner("Loading transactions...");
    let result = synchronizer.sync().await;
    spinner.finish_and_clear();

    match result {
        Ok(snapshot) if json => print_json(&snapshot),
        Ok(_) => {
            println!("{}", subscription.current().display_as_dashboard(formatter));
            Ok(())
        }
        Err(err) => {
            if !json {
                println!("{}", subscription.current().display_as_dashboard(formatter));
            }
            Err(anyhow::Error::new(err).context(LOAD_FAILURE_MESSAGE))
        }
    }
}

/// Re-syncs every `interval` and redraws on each publication until Ctrl-C.
pub async fn watch(
    synchronizer: Arc<FeedSynchronizer>,
    formatter: &CurrencyFormatter,
    interval: Duration,
) -> Result<()> {
    watch_until(synchronizer, formatter, interval, tokio::signal::ctrl_c()).await
}

async fn watch_until<F>(
    synchronizer: Arc<FeedSynchronizer>,
    formatter: &CurrencyFormatter,
    interval: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut subscription = synchronizer.subscribe();
    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);
    let term = console::Term::stdout();

    info!(interval_secs = interval.as_secs(), "Watching transaction feed");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Outcomes arrive through the subscription
                let _ = synchronizer.spawn_sync();
            }
            changed = subscription.changed() => {
                let Some(view) = changed else { break };
                let Some(screen) = render_view(&view, formatter, interval) else {
                    continue;
                };
                if let Err(e) = term.clear_screen() {
                    debug!(error = %e, "Could not clear terminal");
                }
                println!("{screen}");
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Stopping transaction feed watch");
                break;
            }
        }
    }

    Ok(())
}

/// Screen for one watch publication. Views still synchronizing are not drawn,
/// so the last table stays on screen until the cycle settles.
fn render_view(
    view: &FeedView,
    formatter: &CurrencyFormatter,
    interval: Duration,
) -> Option<String> {
    if view.status() == &SyncStatus::Synchronizing {
        return None;
    }
    Some(format!(
        "{}\n\n{}",
        view.display_as_dashboard(formatter),
        ui::style_text(
            &format!(
                "Refreshing every {}s, press Ctrl-C to stop",
                interval.as_secs()
            ),
            ui::StyleType::Subtle
        )
    ))
}
