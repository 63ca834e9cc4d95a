//! PostgreSQL materializer.
//!
//! Opens a single `PgConnection` per query using sqlx; no pool is kept.
//!
//! The query goes over the simple query protocol, so every value arrives in
//! PostgreSQL's text format. Values without a dedicated decoder, or that do
//! not fit one (`NaN` or very large `NUMERIC`s), keep the server's own text.

use super::{column_names, format_driver_error, unsupported_value};
use crate::config::ConnectionParams;
use crate::db::{CellValue, MaterializedResult, Row};
use crate::error::{Result, SheetError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::types::Uuid;
use sqlx::{
    Column, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef,
};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs `sql` on a fresh connection and returns every row.
pub(super) async fn materialize(
    params: &ConnectionParams,
    sql: &str,
) -> Result<MaterializedResult> {
    let options = connect_options(params)?;
    let mut conn = options
        .connect()
        .await
        .map_err(|e| SheetError::data_access(map_connection_error(&e, params)))?;

    let outcome = fetch(&mut conn, sql).await;

    if let Err(e) = conn.close().await {
        warn!("Error closing PostgreSQL connection: {}", e);
    }

    outcome
}

fn connect_options(params: &ConnectionParams) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::from_str(params.normalized_url()).map_err(|e| {
        SheetError::data_access(format!(
            "Invalid PostgreSQL URL '{}': {e}",
            params.display_string()
        ))
    })?;

    if let Some(user) = params.username() {
        options = options.username(user);
    }
    if let Some(password) = params.password() {
        options = options.password(password);
    }

    Ok(options)
}

async fn fetch(conn: &mut PgConnection, sql: &str) -> Result<MaterializedResult> {
    let start = Instant::now();

    let rows = (&mut *conn)
        .fetch_all(sqlx::raw_sql(sql))
        .await
        .map_err(|e| SheetError::data_access(format_query_error(&e)))?;

    let columns = match rows.first() {
        Some(first) => column_names(first.columns()),
        None => describe(conn, sql).await,
    };

    let data: Vec<Row> = rows.iter().map(convert_row).collect();

    Ok(MaterializedResult::new(columns, data)?.with_execution_time(start.elapsed()))
}

/// Column names for a statement that produced no rows.
///
/// Preparing the statement yields its result description without fetching
/// anything. Empty if the server cannot describe it.
async fn describe(conn: &mut PgConnection, sql: &str) -> Vec<String> {
    match (&mut *conn).prepare(sql).await {
        Ok(statement) => column_names(statement.columns()),
        Err(e) => {
            debug!("Could not describe empty result: {}", e);
            Vec::new()
        }
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value, decoding by the reported type name.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> CellValue {
    if row.try_get_raw(index).is_ok_and(|v| v.is_null()) {
        return CellValue::Null;
    }

    let decoded = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index),
        "INT2" | "SMALLINT" => row.try_get::<i16, _>(index).map(|v| CellValue::Int(v.into())),
        "INT4" | "INT" | "INTEGER" => row.try_get::<i32, _>(index).map(CellValue::from),
        "INT8" | "BIGINT" => decode::<i64>(row, index),
        "FLOAT4" | "REAL" => row
            .try_get::<f32, _>(index)
            .map(|v| CellValue::Float(v.into())),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index),
        "NUMERIC" => decode::<Decimal>(row, index),
        "DATE" => decode::<NaiveDate>(row, index),
        "TIMESTAMP" => decode::<NaiveDateTime>(row, index),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|v| CellValue::DateTime(v.naive_utc())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "UUID" => row
            .try_get::<Uuid, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "JSON" | "JSONB" => row
            .try_get::<serde_json::Value, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "BYTEA" => decode::<Vec<u8>>(row, index),

        // TEXT, VARCHAR, INTERVAL, TIMETZ, enums, arrays and the rest
        _ => return text_value(row, index, type_name),
    };

    decoded.unwrap_or_else(|e| {
        warn!("Cannot decode {} in column {}: {}", type_name, index, e);
        text_value(row, index, type_name)
    })
}

fn decode<'r, T>(row: &'r PgRow, index: usize) -> std::result::Result<CellValue, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Into<CellValue>,
{
    row.try_get::<T, _>(index).map(Into::into)
}

/// The value as PostgreSQL printed it.
fn text_value(row: &PgRow, index: usize, type_name: &str) -> CellValue {
    match row.try_get_unchecked::<String, _>(index) {
        Ok(text) => CellValue::Text(text),
        Err(e) => {
            warn!("Cannot read {} in column {} as text: {}", type_name, index, e);
            unsupported_value(type_name)
        }
    }
}

/// Maps sqlx connection errors to operator-facing messages.
fn map_connection_error(error: &sqlx::Error, params: &ConnectionParams) -> String {
    let target = params.display_string();
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        format!("Cannot connect to {target}. Check that the server is running.")
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        let user = params.username().unwrap_or("from URL");
        format!("Authentication failed for user '{user}'. Check your credentials.")
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        format!("Database in {target} does not exist.")
    } else {
        format_driver_error(error)
    }
}

/// Formats a query error with PostgreSQL detail and hint when present.
fn format_query_error(error: &sqlx::Error) -> String {
    let mut result = format_driver_error(error);

    if let Some(pg_error) = error
        .as_database_error()
        .and_then(|db| db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>())
    {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
