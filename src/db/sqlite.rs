//! SQLite materializer.
//!
//! SQLite has no credentials; a username or password in the connection
//! parameters is ignored.

use super::{column_names, format_driver_error};
use crate::config::ConnectionParams;
use crate::db::{CellValue, MaterializedResult, Row};
use crate::error::{Result, SheetError};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement, TypeInfo};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs `sql` on a fresh connection and returns every row.
pub(super) async fn materialize(
    params: &ConnectionParams,
    sql: &str,
) -> Result<MaterializedResult> {
    if params.username().is_some() || params.password().is_some() {
        debug!("Ignoring credentials for SQLite connection");
    }

    let options = connect_options(params)?;
    let mut conn = options.connect().await.map_err(|e| {
        SheetError::data_access(format!(
            "Cannot open {}: {}",
            params.display_string(),
            format_driver_error(&e)
        ))
    })?;

    let outcome = fetch(&mut conn, sql).await;

    if let Err(e) = conn.close().await {
        warn!("Error closing SQLite connection: {}", e);
    }

    outcome
}

fn connect_options(params: &ConnectionParams) -> Result<SqliteConnectOptions> {
    SqliteConnectOptions::from_str(params.normalized_url()).map_err(|e| {
        SheetError::data_access(format!(
            "Invalid SQLite URL '{}': {e}",
            params.display_string()
        ))
    })
}

async fn fetch(conn: &mut SqliteConnection, sql: &str) -> Result<MaterializedResult> {
    let start = Instant::now();

    let rows = sqlx::query(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| SheetError::data_access(format_driver_error(&e)))?;

    let columns = match rows.first() {
        Some(first) => column_names(first.columns()),
        None => describe(conn, sql).await,
    };

    let data: Vec<Row> = rows.iter().map(convert_row).collect();

    Ok(MaterializedResult::new(columns, data)?.with_execution_time(start.elapsed()))
}

/// Column names for a statement that produced no rows.
async fn describe(conn: &mut SqliteConnection, sql: &str) -> Vec<String> {
    match (&mut *conn).prepare(sql).await {
        Ok(statement) => column_names(statement.columns()),
        Err(e) => {
            debug!("Could not describe empty result: {}", e);
            Vec::new()
        }
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Decodes by declared column type, then by whatever the stored value is.
///
/// SQLite stores dates as text or numbers, so DATE and DATETIME columns are
/// parsed when possible and otherwise kept as they were stored.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> CellValue {
    let declared = match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row.try_get::<Option<bool>, _>(index).ok().map(CellValue::from),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .map(CellValue::from),
        "DATETIME" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .map(CellValue::from),
        _ => None,
    };

    declared.unwrap_or_else(|| convert_dynamic(row, index))
}

fn convert_dynamic(row: &SqliteRow, index: usize) -> CellValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.into();
    }
    CellValue::Null
}
