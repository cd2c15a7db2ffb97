use tracing::{info, warn};

use crate::error::ReportError;
use crate::period::Period;
use crate::storage::DestinationStore;
use crate::types::TableId;

/// Whether `period`'s rows may be appended to `table`.
///
/// True when the table doesn't exist yet or holds no row for the period's
/// month. Reads only. The check and the following append are not atomic;
/// correctness relies on a single writer per period.
pub fn can_insert(
    store: &dyn DestinationStore,
    table: &TableId,
    period: &Period,
) -> Result<bool, ReportError> {
    info!(
        "Checking if data is already stored from month {} in {table}",
        period.key
    );

    if !store.table_exists(table)? {
        info!("Table {table} does not exist.");
        return Ok(true);
    }

    let existing = store.month_row_count(table, &period.key)?;
    if existing == 0 {
        info!("OK! No data present from previous month ({}).", period.key);
        Ok(true)
    } else {
        warn!(
            rows = existing,
            "KO! Data present from previous month ({}).", period.key
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::resolve_previous_month;
    use crate::report::{Column, Report, Value};
    use crate::storage::sqlite_store::SqliteStore;
    use crate::testing::billing_target;
    use chrono::NaiveDate;

    const COLUMNS: &[Column] = &[Column::text("project"), Column::text("month")];

    fn period(y: i32, m: u32) -> Period {
        resolve_previous_month(NaiveDate::from_ymd_opt(y, m, 15).unwrap())
    }

    fn seeded(month: &str) -> (SqliteStore, TableId) {
        let mut store = SqliteStore::open_in_memory(billing_target()).unwrap();
        let id = billing_target().table("storage_usage");
        let mut report = Report::new(COLUMNS);
        report.push(vec![Value::from("alpha"), Value::from(month)]);
        store.append(&id, &report).unwrap();
        (store, id)
    }

    #[test]
    fn absent_table_allows() {
        let store = SqliteStore::open_in_memory(billing_target()).unwrap();
        let id = billing_target().table("storage_usage");
        assert!(can_insert(&store, &id, &period(2024, 3)).unwrap());
    }

    #[test]
    fn existing_month_denies() {
        let (store, id) = seeded("202402");
        assert!(!can_insert(&store, &id, &period(2024, 3)).unwrap());
    }

    #[test]
    fn other_month_allows() {
        let (store, id) = seeded("202402");
        assert!(can_insert(&store, &id, &period(2024, 4)).unwrap());
    }

    #[test]
    fn empty_existing_table_allows() {
        let mut store = SqliteStore::open_in_memory(billing_target()).unwrap();
        let id = billing_target().table("storage_usage");
        store.append(&id, &Report::new(COLUMNS)).unwrap();
        assert!(can_insert(&store, &id, &period(2024, 3)).unwrap());
    }

    #[test]
    fn store_errors_propagate() {
        let store = SqliteStore::open_in_memory(billing_target()).unwrap();
        let foreign = TableId::new("elsewhere", "reports", "storage_usage");
        assert!(can_insert(&store, &foreign, &period(2024, 3)).is_err());
    }
}
