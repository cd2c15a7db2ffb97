use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::pipeline::{Outcome, ReportOutcome};
use crate::report::Report;
use crate::reports::ReportKind;
use crate::types::TableId;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn kind_label(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::StorageUsage => "Storage usage",
        ReportKind::CostDetail => "Query cost detail",
        ReportKind::CostPerProject => "Cost per project",
    }
}

fn outcome_cell(outcome: &Outcome) -> Cell {
    match outcome {
        Outcome::Stored { rows } => Cell::new(format!("stored {rows} rows")),
        Outcome::Previewed(report) => Cell::new(format!("previewed {} rows", report.len())),
        Outcome::Skipped => Cell::new("skipped (period already stored)"),
    }
}

pub fn print_summary(month: &str, outcomes: &[ReportOutcome]) {
    let mut table = new_table();
    table.set_header(vec!["Report", "Table", "Month", "Result"]);
    for o in outcomes {
        table.add_row(vec![
            Cell::new(kind_label(o.kind)),
            Cell::new(o.table.to_string()),
            Cell::new(month),
            outcome_cell(&o.outcome),
        ]);
    }
    println!("{table}");
}

pub fn print_check(month: &str, decisions: &[(ReportKind, TableId, bool)]) {
    let mut table = new_table();
    table.set_header(vec!["Report", "Table", "Month", "Insert"]);
    for (kind, id, allowed) in decisions {
        table.add_row(vec![
            Cell::new(kind_label(*kind)),
            Cell::new(id.to_string()),
            Cell::new(month),
            Cell::new(if *allowed { "allowed" } else { "already stored" }),
        ]);
    }
    println!("{table}");
}

pub fn print_report_table(kind: ReportKind, report: &Report) {
    println!("{} ({} rows)", kind_label(kind), report.len());
    let mut table = new_table();
    table.set_header(report.column_names());
    for row in &report.rows {
        table.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }
    println!("{table}");
}

pub fn print_reports_json(outcomes: &[ReportOutcome]) {
    let json: serde_json::Map<String, serde_json::Value> = outcomes
        .iter()
        .map(|o| {
            let value = match &o.outcome {
                Outcome::Previewed(report) => report.to_json(),
                Outcome::Skipped => serde_json::json!("skipped"),
                Outcome::Stored { rows } => serde_json::json!({ "stored": rows }),
            };
            (o.kind.table_name().to_string(), value)
        })
        .collect();

    match serde_json::to_string_pretty(&json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("costrep: JSON serialization failed: {e}"),
    }
}
