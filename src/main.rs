mod cli;
mod config;
mod cost;
mod error;
mod gate;
mod output;
mod period;
mod pipeline;
mod report;
mod reports;
mod sources;
mod storage;
#[cfg(test)]
mod testing;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, OutputFormat};
use pipeline::{Mode, Outcome, Pipeline};
use reports::{ReportContext, ReportKind};
use sources::bucket::FsBucket;
use sources::warehouse::SqliteWarehouse;
use storage::sqlite_store::SqliteStore;

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Some(ref event) = cli.event {
        debug!(bytes = event.len(), "Ignoring trigger payload");
    }

    let settings = config::load_config(cli.config.as_deref())?
        .with_env(|var| std::env::var(var).ok())
        .into_settings()?;

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let period = period::resolve_previous_month(today);
    info!(
        "Reporting period {} ({} to {})",
        period.key, period.first_day, period.last_day
    );

    let warehouse = SqliteWarehouse::open(&settings.warehouse_path).with_context(|| {
        format!(
            "Failed to open warehouse {}",
            settings.warehouse_path.display()
        )
    })?;
    let bucket = FsBucket::new(&settings.bucket_root);
    let mut store = SqliteStore::open(&settings.billing_db_path, settings.billing.clone())
        .with_context(|| {
            format!(
                "Failed to open billing dataset {}",
                settings.billing_db_path.display()
            )
        })?;

    let ctx = ReportContext {
        usage: &warehouse,
        blobs: &bucket,
        settings: &settings.source,
    };
    let mut pipeline = Pipeline::new(ctx, &mut store, &settings.billing);

    match cli.effective_command() {
        Command::Run => {
            let outcomes = pipeline.run(&period, Mode::Commit)?;
            let stored = outcomes
                .iter()
                .filter(|o| matches!(o.outcome, Outcome::Stored { .. }))
                .count();
            info!(stored, skipped = outcomes.len() - stored, "Run finished");
            output::print_summary(&period.key, &outcomes);
        }
        Command::Check => {
            let decisions = pipeline.check(&period)?;
            output::print_check(&period.key, &decisions);
        }
        Command::Preview { reports, format } => {
            let kinds: Vec<ReportKind> = if reports.is_empty() {
                ReportKind::ALL.to_vec()
            } else {
                reports
            };
            let outcomes = pipeline.run_only(&kinds, &period, Mode::Preview)?;
            match format {
                OutputFormat::Json => output::print_reports_json(&outcomes),
                OutputFormat::Table => {
                    for o in &outcomes {
                        match &o.outcome {
                            Outcome::Previewed(report) => output::print_report_table(o.kind, report),
                            _ => output::print_summary(&period.key, std::slice::from_ref(o)),
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
