pub mod sqlite_store;

use crate::error::ReportError;
use crate::report::Report;
use crate::types::TableId;

/// Destination for finished reports.
///
/// Tables are append-only. Nothing here enforces one batch per month; that is
/// the gate's job.
pub trait DestinationStore {
    fn table_exists(&self, table: &TableId) -> Result<bool, ReportError>;

    /// Number of rows in `table` whose `month` column equals `month`.
    /// The table must exist.
    fn month_row_count(&self, table: &TableId, month: &str) -> Result<u64, ReportError>;

    /// Append every row of `report`, creating the table from the report's
    /// columns if it is missing. Either all rows land or none do.
    fn append(&mut self, table: &TableId, report: &Report) -> Result<usize, ReportError>;
}
