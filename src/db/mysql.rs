//! MySQL / MariaDB materializer.
//!
//! The query is sent as plain text, so values come back in the text
//! protocol; anything without a dedicated decoder keeps the server's text.

use super::{column_names, format_driver_error, unsupported_value};
use crate::config::ConnectionParams;
use crate::db::{CellValue, MaterializedResult, Row};
use crate::error::{Result, SheetError};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
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
        warn!("Error closing MySQL connection: {}", e);
    }

    outcome
}

fn connect_options(params: &ConnectionParams) -> Result<MySqlConnectOptions> {
    let mut options = MySqlConnectOptions::from_str(params.normalized_url()).map_err(|e| {
        SheetError::data_access(format!(
            "Invalid MySQL URL '{}': {e}",
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

async fn fetch(conn: &mut MySqlConnection, sql: &str) -> Result<MaterializedResult> {
    let start = Instant::now();

    let rows = (&mut *conn)
        .fetch_all(sqlx::raw_sql(sql))
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
async fn describe(conn: &mut MySqlConnection, sql: &str) -> Vec<String> {
    match (&mut *conn).prepare(sql).await {
        Ok(statement) => column_names(statement.columns()),
        Err(e) => {
            debug!("Could not describe empty result: {}", e);
            Vec::new()
        }
    }
}

fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> CellValue {
    if row.try_get_raw(index).is_ok_and(|v| v.is_null()) {
        return CellValue::Null;
    }

    let upper = type_name.to_uppercase();
    let decoded = match upper.as_str() {
        "BOOLEAN" => decode::<bool>(row, index),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => decode::<i64>(row, index),
        // YEAR is not an integer type to sqlx, but its value is one
        "YEAR" => row
            .try_get_unchecked::<u16, _>(index)
            .map(|v| CellValue::Int(v.into())),
        t if t.ends_with("UNSIGNED") => row.try_get::<u64, _>(index).map(|v| {
            i64::try_from(v)
                .map(CellValue::Int)
                .unwrap_or_else(|_| CellValue::Text(v.to_string()))
        }),
        "FLOAT" => row
            .try_get::<f32, _>(index)
            .map(|v| CellValue::Float(v.into())),
        "DOUBLE" => decode::<f64>(row, index),
        "DECIMAL" => decode::<Decimal>(row, index),
        "DATE" => decode::<NaiveDate>(row, index),
        "DATETIME" | "TIMESTAMP" => decode::<NaiveDateTime>(row, index),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            decode::<Vec<u8>>(row, index)
        }
        "BIT" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(CellValue::Bytes),

        // VARCHAR, CHAR, TEXT, ENUM, SET, JSON, TIME and friends
        _ => return text_value(row, index, type_name),
    };

    decoded.unwrap_or_else(|e| {
        warn!("Cannot decode {} in column {}: {}", type_name, index, e);
        text_value(row, index, type_name)
    })
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize) -> std::result::Result<CellValue, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql> + Into<CellValue>,
{
    row.try_get::<T, _>(index).map(Into::into)
}

/// The value as the server sent it.
fn text_value(row: &MySqlRow, index: usize, type_name: &str) -> CellValue {
    match row.try_get_unchecked::<String, _>(index) {
        Ok(text) => CellValue::Text(text),
        Err(e) => {
            warn!("Cannot read {} in column {} as text: {}", type_name, index, e);
            unsupported_value(type_name)
        }
    }
}

fn map_connection_error(error: &sqlx::Error, params: &ConnectionParams) -> String {
    let target = params.display_string();
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        format!("Cannot connect to {target}. Check that the server is running.")
    } else if error_str.contains("access denied") {
        let user = params.username().unwrap_or("from URL");
        format!("Access denied for user '{user}'. Check your credentials.")
    } else if error_str.contains("unknown database") {
        format!("Database in {target} does not exist.")
    } else {
        format_driver_error(error)
    }
}
