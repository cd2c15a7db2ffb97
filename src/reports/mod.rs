pub mod cost_detail;
pub mod cost_per_project;
pub mod storage_usage;

use clap::ValueEnum;

use crate::config::SourceSettings;
use crate::error::ReportError;
use crate::period::Period;
use crate::report::Report;
use crate::sources::{BlobSource, UsageSource};

/// Everything a generator reads from. Generators never write through it.
pub struct ReportContext<'a> {
    pub usage: &'a dyn UsageSource,
    pub blobs: &'a dyn BlobSource,
    pub settings: &'a SourceSettings,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Per tracked dataset: warehouse table bytes and bucket bytes
    StorageUsage,
    /// One row per finished query
    CostDetail,
    /// Queries, GB and cost per project, user and month
    CostPerProject,
}

impl ReportKind {
    /// Processing order of a run.
    pub const ALL: [ReportKind; 3] = [
        ReportKind::StorageUsage,
        ReportKind::CostDetail,
        ReportKind::CostPerProject,
    ];

    /// Destination table in the billing dataset.
    pub fn table_name(self) -> &'static str {
        match self {
            ReportKind::StorageUsage => "storage_usage",
            ReportKind::CostDetail => "bq_jobs_costs_detail",
            ReportKind::CostPerProject => "bq_jobs_costs_per_project",
        }
    }

    pub fn generate(self, period: &Period, ctx: &ReportContext<'_>) -> Result<Report, ReportError> {
        match self {
            ReportKind::StorageUsage => storage_usage::generate(period, ctx),
            ReportKind::CostDetail => cost_detail::generate(period, ctx),
            ReportKind::CostPerProject => cost_per_project::generate(period, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_distinct() {
        let mut names: Vec<_> = ReportKind::ALL.iter().map(|k| k.table_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn every_schema_has_a_month_column() {
        for columns in [
            storage_usage::COLUMNS,
            cost_detail::COLUMNS,
            cost_per_project::COLUMNS,
        ] {
            assert!(columns.iter().any(|c| c.name == "month"));
        }
    }
}
