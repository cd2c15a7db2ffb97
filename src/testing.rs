//! In-memory usage and blob sources for unit tests.

use std::collections::HashMap;

use crate::config::{BillingTarget, SourceSettings};
use crate::error::ReportError;
use crate::sources::{BlobSource, JobFilter, UsageSource};
use crate::types::{Blob, JobRecord, TableId, TableMetadata};

/// A finished, uncached query job with `bytes` billed and processed.
pub fn job(job_id: &str, project: &str, user: &str, start: &str, bytes: u64) -> JobRecord {
    JobRecord {
        job_id: job_id.to_string(),
        project_id: project.to_string(),
        user_email: user.to_string(),
        job_type: "QUERY".to_string(),
        state: "DONE".to_string(),
        start_time: start.parse().unwrap(),
        total_bytes_billed: bytes,
        total_bytes_processed: bytes,
        cache_hit: Some(false),
    }
}

pub fn source_settings(datasets: &[&str]) -> SourceSettings {
    SourceSettings {
        project_id: "core".to_string(),
        bucket_name: "data".to_string(),
        main_table_name: "main".to_string(),
        tracked_datasets: datasets.iter().map(|d| d.to_string()).collect(),
        jobs_region: "region-us".to_string(),
    }
}

pub fn billing_target() -> BillingTarget {
    BillingTarget {
        project_id: "billing".to_string(),
        dataset_id: "reports".to_string(),
    }
}

/// Returns every stored job regardless of the filter, so the generators'
/// own period and state checks are what tests observe.
#[derive(Default)]
pub struct FakeUsage {
    pub jobs: Vec<JobRecord>,
    pub tables: HashMap<TableId, TableMetadata>,
    pub unavailable: bool,
}

impl FakeUsage {
    pub fn with_table(mut self, dataset: &str, num_bytes: u64) -> Self {
        self.tables.insert(
            TableId::new("core", dataset, "main"),
            TableMetadata {
                num_rows: 1,
                num_bytes,
            },
        );
        self
    }
}

impl UsageSource for FakeUsage {
    fn query_jobs(&self, _filter: &JobFilter) -> Result<Vec<JobRecord>, ReportError> {
        if self.unavailable {
            return Err(ReportError::Unavailable("jobs view".to_string()));
        }
        Ok(self.jobs.clone())
    }

    fn table_metadata(&self, id: &TableId) -> Result<Option<TableMetadata>, ReportError> {
        Ok(self.tables.get(id).copied())
    }
}

#[derive(Default)]
pub struct FakeBlobs {
    pub blobs: HashMap<String, Vec<Blob>>,
}

impl FakeBlobs {
    pub fn with_blob(mut self, bucket: &str, name: &str, size: u64) -> Self {
        self.blobs.entry(bucket.to_string()).or_default().push(Blob {
            name: name.to_string(),
            size,
        });
        self
    }
}

impl BlobSource for FakeBlobs {
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<Blob>, ReportError> {
        Ok(self
            .blobs
            .get(bucket)
            .map(|blobs| {
                blobs
                    .iter()
                    .filter(|b| b.name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
