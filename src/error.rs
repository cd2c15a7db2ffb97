use crate::types::TableId;

/// Errors raised while resolving, generating or storing reports.
///
/// Duplicate periods and absent destination tables are not errors; the gate
/// turns both into a boolean.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("table not found: {0}")]
    TableNotFound(TableId),

    #[error("rows for {table} do not match its schema: {detail}")]
    Schema { table: TableId, detail: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
