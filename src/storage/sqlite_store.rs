use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use super::DestinationStore;
use crate::config::BillingTarget;
use crate::error::ReportError;
use crate::report::Report;
use crate::types::TableId;

/// Billing dataset kept in a single SQLite file. One SQLite table per
/// destination table.
pub struct SqliteStore {
    conn: Connection,
    target: BillingTarget,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteStore {
    pub fn open(path: &Path, target: BillingTarget) -> Result<Self, ReportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        Ok(Self { conn, target })
    }

    #[cfg(test)]
    pub fn open_in_memory(target: BillingTarget) -> Result<Self, ReportError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, target })
    }

    #[cfg(test)]
    pub fn row_count(&self, table: &TableId) -> u64 {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&table.table));
        self.conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .unwrap_or(0)
    }

    /// SQLite table name for `table`, if it belongs to this dataset.
    fn local_name(&self, table: &TableId) -> Result<String, ReportError> {
        if table.project != self.target.project_id || table.dataset != self.target.dataset_id {
            return Err(ReportError::Config(format!(
                "{table} is outside billing dataset {}.{}",
                self.target.project_id, self.target.dataset_id
            )));
        }
        Ok(quote_ident(&table.table))
    }
}

impl DestinationStore for SqliteStore {
    fn table_exists(&self, table: &TableId) -> Result<bool, ReportError> {
        self.local_name(table)?;
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table.table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn month_row_count(&self, table: &TableId, month: &str) -> Result<u64, ReportError> {
        let name = self.local_name(table)?;
        let sql = format!("SELECT COUNT(*) FROM {name} WHERE month = ?1");
        let count: i64 = self.conn.query_row(&sql, params![month], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn append(&mut self, table: &TableId, report: &Report) -> Result<usize, ReportError> {
        let name = self.local_name(table)?;

        if let Some(bad) = report.rows.iter().find(|r| r.len() != report.columns.len()) {
            return Err(ReportError::Schema {
                table: table.clone(),
                detail: format!(
                    "row has {} values, expected {}",
                    bad.len(),
                    report.columns.len()
                ),
            });
        }

        let column_defs: Vec<String> = report
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name), c.ty.sql_type()))
            .collect();
        let column_names: Vec<String> = report.columns.iter().map(|c| quote_ident(c.name)).collect();
        let placeholders: Vec<String> = (1..=report.columns.len()).map(|i| format!("?{i}")).collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {name} ({})",
            column_defs.join(", ")
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {name} ({}) VALUES ({})",
                column_names.join(", "),
                placeholders.join(", ")
            ))?;
            for row in &report.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;
        debug!(table = %table, rows = report.len(), "Rows appended");
        info!("Data successfully stored in {table}");
        Ok(report.len())
    }
}
