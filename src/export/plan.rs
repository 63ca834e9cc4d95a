//! Turns the grid into a sheet layout before anything is written.

use crate::db::CellValue;
use crate::error::{Result, SheetError};
use crate::grid::GridStore;
use chrono::NaiveDateTime;

/// Where the header row labels come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderSource {
    /// The grid's own column labels.
    #[default]
    Grid,
    /// Operator-entered labels, one per column.
    Custom(Vec<String>),
}

/// One cell of the output sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedCell {
    Text(String),
    /// Written as a date with the date number format.
    Date(NaiveDateTime),
    Blank,
}

impl PlannedCell {
    fn from_value(value: &CellValue) -> Self {
        match value {
            CellValue::Null => Self::Blank,
            CellValue::Text(s) => Self::Text(s.clone()),
            CellValue::Date(_) | CellValue::DateTime(_) => match value.as_datetime() {
                Some(dt) => Self::Date(dt),
                None => Self::Blank,
            },
            other => Self::Text(other.to_display_string()),
        }
    }
}

/// Header plus typed data rows, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub header: Vec<String>,
    pub rows: Vec<Vec<PlannedCell>>,
}

/// Lays out the grid for export.
///
/// Fails with "No data to save." when the grid has no rows, and when custom
/// headers do not cover every column exactly once.
pub fn plan_sheet(store: &GridStore, headers: &HeaderSource) -> Result<SheetPlan> {
    if store.row_count() == 0 {
        return Err(SheetError::export("No data to save."));
    }

    let header = match headers {
        HeaderSource::Grid => store.column_names().to_vec(),
        HeaderSource::Custom(labels) if labels.len() == store.column_count() => labels.clone(),
        HeaderSource::Custom(labels) => {
            return Err(SheetError::export(format!(
                "Expected {} header labels but got {}",
                store.column_count(),
                labels.len()
            )))
        }
    };

    let rows = store
        .rows()
        .iter()
        .map(|row| row.iter().map(PlannedCell::from_value).collect())
        .collect();

    Ok(SheetPlan { header, rows })
}
