use tracing::{debug, info};

use super::ReportContext;
use crate::error::ReportError;
use crate::period::Period;
use crate::report::{Column, Report, Value};
use crate::types::{StorageSnapshot, TableId};

pub const COLUMNS: &[Column] = &[
    Column::text("project"),
    Column::text("month"),
    Column::integer("cloud_storage_bytes"),
    Column::integer("bigquery_storage_bytes"),
];

/// Measure one tracked dataset: its main table's size from metadata, and the
/// total size of every blob whose name starts with the dataset name.
///
/// A missing main table is a configuration error, not an empty snapshot.
pub fn snapshot(
    dataset: &str,
    period: &Period,
    ctx: &ReportContext<'_>,
) -> Result<StorageSnapshot, ReportError> {
    let settings = ctx.settings;
    info!("Scanning {dataset} table...");

    let table_id = TableId::new(&settings.project_id, dataset, &settings.main_table_name);
    info!("Checking {table_id}...");
    let meta = ctx
        .usage
        .table_metadata(&table_id)?
        .ok_or_else(|| ReportError::TableNotFound(table_id.clone()))?;
    info!(
        "{dataset} table has {} rows, {} bytes",
        meta.num_rows, meta.num_bytes
    );

    info!("Checking {}/{dataset}...", settings.bucket_name);
    let mut cloud_storage_bytes: u64 = 0;
    for blob in ctx.blobs.list_blobs(&settings.bucket_name, dataset)? {
        debug!(blob = %blob.name, size = blob.size);
        cloud_storage_bytes += blob.size;
    }

    info!(
        dataset,
        bigquery_storage_bytes = meta.num_bytes,
        cloud_storage_bytes,
        "Storage measured"
    );

    Ok(StorageSnapshot {
        dataset: dataset.to_string(),
        month: period.key.clone(),
        cloud_storage_bytes,
        bigquery_storage_bytes: meta.num_bytes,
    })
}

pub fn generate(period: &Period, ctx: &ReportContext<'_>) -> Result<Report, ReportError> {
    info!("Generating Storage Usage report");
    let mut report = Report::new(COLUMNS);
    for dataset in &ctx.settings.tracked_datasets {
        let snap = snapshot(dataset, period, ctx)?;
        report.push(vec![
            Value::from(snap.dataset),
            Value::from(snap.month),
            Value::from(snap.cloud_storage_bytes),
            Value::from(snap.bigquery_storage_bytes),
        ]);
    }
    debug!(rows = ?report.rows, "Storage usage rows");
    Ok(report)
}
