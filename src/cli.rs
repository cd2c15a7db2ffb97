use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::reports::ReportKind;

#[derive(Parser, Debug)]
#[command(
    name = "costrep",
    about = "Append last month's warehouse cost and storage reports to the billing dataset"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (default: platform config dir, costrep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD); the report covers the month before it
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Trigger payload from the scheduler. Accepted and ignored.
    #[arg(long, global = true)]
    pub event: Option<String>,

    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate and store every report not yet stored for the period (default)
    Run,
    /// Show, per report table, whether the period can still be inserted
    Check,
    /// Generate reports and print them instead of storing
    Preview {
        /// Only this report (repeatable)
        #[arg(long = "report", value_enum)]
        reports: Vec<ReportKind>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
