//! Database access layer for db-sheet.
//!
//! Provides a trait-based interface for turning one query into a fully
//! materialized result, with sqlx-backed implementations for PostgreSQL,
//! MySQL/MariaDB and SQLite.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailingDataSource, MockDataSource};
pub use types::{CellValue, MaterializedResult, Row};

use crate::config::ConnectionParams;
use crate::error::{Result, SheetError};
use async_trait::async_trait;
use tracing::{debug, info};

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a URL scheme.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Picks the backend for the given connection parameters.
    pub fn from_params(params: &ConnectionParams) -> Result<Self> {
        if !params.has_url() {
            return Err(SheetError::data_access("No database URL given"));
        }

        let scheme = params.scheme().ok_or_else(|| {
            SheetError::data_access(format!(
                "Database URL '{}' has no scheme. Expected postgres://, mysql:// or sqlite://",
                params.display_string()
            ))
        })?;

        Self::parse(&scheme).ok_or_else(|| {
            SheetError::data_access(format!(
                "Unsupported database URL scheme '{scheme}'. Expected postgres, mysql or sqlite"
            ))
        })
    }
}

/// Something that can run one query and hand back every row.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Opens a connection, runs `sql` verbatim, and returns the full result.
    ///
    /// The connection is released before returning, on success and on failure.
    async fn materialize(&self, params: &ConnectionParams, sql: &str)
        -> Result<MaterializedResult>;
}

/// Data source backed by real database drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlDataSource;

impl SqlDataSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataSource for SqlDataSource {
    async fn materialize(
        &self,
        params: &ConnectionParams,
        sql: &str,
    ) -> Result<MaterializedResult> {
        let backend = DatabaseBackend::from_params(params)?;
        debug!("Using {} backend for {}", backend.as_str(), params.display_string());

        let result = match backend {
            DatabaseBackend::Postgres => postgres::materialize(params, sql).await,
            DatabaseBackend::MySql => mysql::materialize(params, sql).await,
            DatabaseBackend::Sqlite => sqlite::materialize(params, sql).await,
        }?;

        info!(
            "Query returned {} rows x {} columns in {}ms",
            result.row_count(),
            result.column_count(),
            result.execution_time.as_millis()
        );
        Ok(result)
    }
}

/// Collects column names from driver metadata.
fn column_names<C: sqlx::Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// Placeholder for column types no decoder exists for.
fn unsupported_value(type_name: &str) -> CellValue {
    CellValue::Text(format!("<{}>", type_name.to_lowercase()))
}

/// Formats a driver error for the operator, keeping the database's own message.
fn format_driver_error(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("{} (code {code})", db_error.message()),
            None => db_error.message().to_string(),
        },
        None => error.to_string(),
    }
}
