use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::debug;

use super::{JobFilter, UsageSource};
use crate::error::ReportError;
use crate::types::{JobRecord, TableId, TableMetadata};

/// Warehouse backed by a SQLite database holding a `jobs` view export and a
/// `table_storage` catalog.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Open an existing warehouse database. Reads only.
    pub fn open(path: &Path) -> Result<Self, ReportError> {
        if !path.is_file() {
            return Err(ReportError::Unavailable(format!(
                "warehouse database {} not found",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, ReportError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Create the `jobs` and `table_storage` tables if they don't exist.
#[cfg(test)]
pub fn init_schema(conn: &Connection) -> Result<(), ReportError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jobs (
             job_id                 TEXT PRIMARY KEY,
             project_id             TEXT NOT NULL,
             user_email             TEXT NOT NULL,
             region                 TEXT NOT NULL DEFAULT 'region-us',
             job_type               TEXT NOT NULL,
             state                  TEXT NOT NULL,
             start_time             TEXT NOT NULL,
             total_bytes_billed     INTEGER,
             total_bytes_processed  INTEGER,
             cache_hit              INTEGER
         );

         CREATE INDEX IF NOT EXISTS idx_jobs_start_time ON jobs(start_time);

         CREATE TABLE IF NOT EXISTS table_storage (
             project_id  TEXT NOT NULL,
             dataset_id  TEXT NOT NULL,
             table_id    TEXT NOT NULL,
             num_rows    INTEGER NOT NULL,
             num_bytes   INTEGER NOT NULL,
             PRIMARY KEY (project_id, dataset_id, table_id)
         );",
    )?;
    Ok(())
}

fn non_negative(n: Option<i64>) -> u64 {
    n.map(|v| v.max(0) as u64).unwrap_or(0)
}

impl UsageSource for SqliteWarehouse {
    fn query_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, ReportError> {
        debug!(
            region = %filter.region,
            from = %filter.start,
            to = %filter.end,
            "Querying jobs"
        );

        let mut stmt = self.conn.prepare(
            "SELECT job_id, project_id, user_email, job_type, state, start_time,
                    total_bytes_billed, total_bytes_processed, cache_hit
               FROM jobs
              WHERE region = ?1
                AND job_type = ?2
                AND state = ?3
                AND julianday(start_time) BETWEEN julianday(?4) AND julianday(?5)",
        )?;

        let rows = stmt.query_map(
            params![
                filter.region,
                filter.job_type,
                filter.state,
                filter.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                filter.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ],
            |row| {
                let ts_str: String = row.get(5)?;
                let start_time: DateTime<Utc> = ts_str.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(JobRecord {
                    job_id: row.get(0)?,
                    project_id: row.get(1)?,
                    user_email: row.get(2)?,
                    job_type: row.get(3)?,
                    state: row.get(4)?,
                    start_time,
                    total_bytes_billed: non_negative(row.get(6)?),
                    total_bytes_processed: non_negative(row.get(7)?),
                    cache_hit: row.get(8)?,
                })
            },
        )?;

        let jobs = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = jobs.len(), "Jobs fetched");
        Ok(jobs)
    }

    fn table_metadata(&self, id: &TableId) -> Result<Option<TableMetadata>, ReportError> {
        let meta = self
            .conn
            .query_row(
                "SELECT num_rows, num_bytes FROM table_storage
                  WHERE project_id = ?1 AND dataset_id = ?2 AND table_id = ?3",
                params![id.project, id.dataset, id.table],
                |row| {
                    Ok(TableMetadata {
                        num_rows: non_negative(row.get(0)?),
                        num_bytes: non_negative(row.get(1)?),
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }
}
