use std::collections::BTreeMap;

use tracing::{debug, info};

use super::ReportContext;
use crate::cost::{bytes_to_gb, query_cost, round_to};
use crate::error::ReportError;
use crate::period::Period;
use crate::report::{Column, Report, Value};
use crate::sources::JobFilter;

pub const COLUMNS: &[Column] = &[
    Column::text("project_id"),
    Column::text("user_email"),
    Column::text("month"),
    Column::integer("num_queries"),
    Column::float("bytes_processed_in_gb"),
    Column::float("cost_in_dollar"),
];

#[derive(Default)]
struct Totals {
    num_queries: u64,
    bytes_billed: u64,
    /// Sum of already-rounded per-query costs.
    cost: f64,
}

pub fn generate(period: &Period, ctx: &ReportContext<'_>) -> Result<Report, ReportError> {
    info!("Generating BigQuery Jobs Costs per User report");
    let filter = JobFilter::finished_queries(&ctx.settings.jobs_region, period);
    let jobs = ctx.usage.query_jobs(&filter)?;

    let mut groups: BTreeMap<(String, String, String), Totals> = BTreeMap::new();
    for job in jobs.iter().filter(|j| filter.matches(j)) {
        let totals = groups
            .entry((job.project_id.clone(), job.user_email.clone(), job.month()))
            .or_default();
        totals.num_queries += 1;
        totals.bytes_billed += job.total_bytes_billed;
        totals.cost += query_cost(job);
    }

    let mut report = Report::new(COLUMNS);
    for ((project_id, user_email, month), totals) in groups {
        report.push(vec![
            Value::from(project_id),
            Value::from(user_email),
            Value::from(month),
            Value::from(totals.num_queries),
            Value::from(bytes_to_gb(totals.bytes_billed)),
            Value::from(round_to(totals.cost, 4)),
        ]);
    }

    info!(rows = report.len(), "Per-project costs ready");
    debug!(rows = ?report.rows, "Per-project cost rows");
    Ok(report)
}
