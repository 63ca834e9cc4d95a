//! Batch mode: one query, one workbook, no terminal UI.

use crate::config::ConnectionParams;
use crate::error::{Result, SheetError};
use crate::export::{ExportTarget, HeaderSource};
use crate::session::Session;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What a headless run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlessSummary {
    pub path: PathBuf,
    pub sheet: String,
    pub rows: usize,
    pub columns: usize,
    pub headers: Vec<String>,
    pub duration_ms: u64,
}

/// Runs `sql` and writes the grid to `target`.
///
/// With `HeaderSource::Custom` the labels replace the grid's own in the
/// header row; they are not applied to the grid.
pub async fn run(
    session: &mut Session,
    params: &ConnectionParams,
    sql: &str,
    headers: HeaderSource,
    target: &ExportTarget,
) -> Result<HeadlessSummary> {
    let outcome = session.execute_query(params, sql).await?;
    info!(
        "Retrieved {} rows x {} columns",
        outcome.rows, outcome.columns
    );

    let path = session.export(&headers, target)?;

    let headers = match headers {
        HeaderSource::Grid => session.grid().column_names().to_vec(),
        HeaderSource::Custom(labels) => labels,
    };

    Ok(HeadlessSummary {
        path,
        sheet: target.sheet_name.clone(),
        rows: outcome.rows,
        columns: outcome.columns,
        headers,
        duration_ms: outcome.execution_time.as_millis() as u64,
    })
}

/// Formats the summary for stdout.
pub fn format_summary(summary: &HeadlessSummary, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(summary)
            .map_err(|e| SheetError::internal(format!("Failed to serialize summary: {e}")));
    }

    Ok(format!(
        "Data saved to Excel successfully!\n{} row{} x {} column{} written to {} (sheet '{}')",
        summary.rows,
        if summary.rows == 1 { "" } else { "s" },
        summary.columns,
        if summary.columns == 1 { "" } else { "s" },
        summary.path.display(),
        summary.sheet
    ))
}
