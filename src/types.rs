use std::fmt;

use chrono::{DateTime, Utc};
/// Fully qualified warehouse table: `project.dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableId {
    pub fn new(project: &str, dataset: &str, table: &str) -> Self {
        Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
            table: table.to_string(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// One executed warehouse job, as exposed by the organization jobs view.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job_id: String,
    pub project_id: String,
    pub user_email: String,
    pub job_type: String,
    pub state: String,
    pub start_time: DateTime<Utc>,
    pub total_bytes_billed: u64,
    pub total_bytes_processed: u64,
    /// `None` when the view leaves it NULL; such jobs are not charged.
    pub cache_hit: Option<bool>,
}

impl JobRecord {
    /// `YYYYMM` of the job's start time.
    pub fn month(&self) -> String {
        self.start_time.format("%Y%m").to_string()
    }
}

/// Row count and byte size of a warehouse table, read from table metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableMetadata {
    pub num_rows: u64,
    pub num_bytes: u64,
}

/// A listed object in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub name: String,
    pub size: u64,
}

/// Storage footprint of one tracked dataset for a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSnapshot {
    pub dataset: String,
    pub month: String,
    pub cloud_storage_bytes: u64,
    pub bigquery_storage_bytes: u64,
}
