use tracing::{debug, info};

use super::ReportContext;
use crate::cost::{bytes_to_gb, query_cost};
use crate::error::ReportError;
use crate::period::Period;
use crate::report::{Column, Report, Value};
use crate::sources::JobFilter;

pub const COLUMNS: &[Column] = &[
    Column::text("project_id"),
    Column::text("month"),
    Column::timestamp("start_time"),
    Column::text("user_email"),
    Column::text("job_id"),
    Column::float("bytes_processed_in_gb"),
    Column::float("cost_in_dollar"),
];

/// One row per finished query, ordered by project, start time, then user.
pub fn generate(period: &Period, ctx: &ReportContext<'_>) -> Result<Report, ReportError> {
    info!("Generating BigQuery Jobs Costs Detail report");
    let filter = JobFilter::finished_queries(&ctx.settings.jobs_region, period);
    let mut jobs = ctx.usage.query_jobs(&filter)?;
    jobs.retain(|j| filter.matches(j));
    jobs.sort_by(|a, b| {
        (&a.project_id, a.start_time, &a.user_email)
            .cmp(&(&b.project_id, b.start_time, &b.user_email))
    });

    let mut report = Report::new(COLUMNS);
    for job in &jobs {
        report.push(vec![
            Value::from(job.project_id.as_str()),
            Value::from(job.month()),
            Value::from(job.start_time),
            Value::from(job.user_email.as_str()),
            Value::from(job.job_id.as_str()),
            Value::from(bytes_to_gb(job.total_bytes_billed)),
            Value::from(query_cost(job)),
        ]);
    }

    info!(rows = report.len(), "Per-query costs ready");
    debug!(rows = ?report.rows, "Per-query cost rows");
    Ok(report)
}
