pub mod bucket;
pub mod warehouse;

use chrono::{DateTime, NaiveTime, Utc};

use crate::error::ReportError;
use crate::period::Period;
use crate::types::{Blob, JobRecord, TableId, TableMetadata};

/// Selection over the organization jobs view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFilter {
    /// Organization scope, e.g. `region-us`.
    pub region: String,
    pub job_type: String,
    pub state: String,
    /// Earliest accepted start time.
    pub start: DateTime<Utc>,
    /// Latest accepted start time, inclusive. Midnight opening the period's
    /// last day, so later jobs on that day fall outside.
    pub end: DateTime<Utc>,
}

impl JobFilter {
    /// Finished query jobs started during `period`.
    pub fn finished_queries(region: &str, period: &Period) -> Self {
        Self {
            region: region.to_string(),
            job_type: "QUERY".to_string(),
            state: "DONE".to_string(),
            start: period.first_day.and_time(NaiveTime::MIN).and_utc(),
            end: period.last_day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Record-level check for everything except the region, which records
    /// don't carry.
    pub fn matches(&self, r: &JobRecord) -> bool {
        r.job_type == self.job_type
            && r.state == self.state
            && r.start_time >= self.start
            && r.start_time <= self.end
    }
}

/// Warehouse side of the usage data: job history and table metadata.
pub trait UsageSource {
    fn query_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, ReportError>;

    /// Metadata for a table, or `None` if the table doesn't exist.
    fn table_metadata(&self, id: &TableId) -> Result<Option<TableMetadata>, ReportError>;
}

/// Object storage listing.
pub trait BlobSource {
    /// Every object in `bucket` whose name starts with `prefix`.
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<Blob>, ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::resolve_previous_month;
    use crate::testing::job;
    use chrono::NaiveDate;

    #[test]
    fn filter_checks_type_state_and_dates() {
        let period = resolve_previous_month(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let filter = JobFilter::finished_queries("region-us", &period);

        let ok = job("a", "p", "u@x.io", "2024-02-10T23:00:00Z", 1);
        assert!(filter.matches(&ok));

        let mut load = ok.clone();
        load.job_type = "LOAD".to_string();
        assert!(!filter.matches(&load));

        let mut running = ok.clone();
        running.state = "RUNNING".to_string();
        assert!(!filter.matches(&running));

        let late = job("b", "p", "u@x.io", "2024-03-01T00:00:00Z", 1);
        assert!(!filter.matches(&late));
    }

    #[test]
    fn window_ends_at_midnight_opening_the_last_day() {
        let period = resolve_previous_month(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let filter = JobFilter::finished_queries("region-us", &period);

        assert!(filter.matches(&job("a", "p", "u@x.io", "2024-02-01T00:00:00Z", 1)));
        assert!(filter.matches(&job("b", "p", "u@x.io", "2024-02-29T00:00:00Z", 1)));
        assert!(!filter.matches(&job("c", "p", "u@x.io", "2024-02-29T00:00:01Z", 1)));
        assert!(!filter.matches(&job("d", "p", "u@x.io", "2024-02-29T15:00:00Z", 1)));
        assert!(!filter.matches(&job("e", "p", "u@x.io", "2024-01-31T23:59:59Z", 1)));
    }
}
