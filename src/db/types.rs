//! Query result types for db-sheet.
//!
//! Defines the structures used to carry a fully materialized result set
//! from the database into the grid.

use crate::error::{Result, SheetError};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

/// A result set pulled completely into memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedResult {
    /// Column names in driver order.
    pub columns: Vec<String>,

    /// Rows of data, each aligned positionally with `columns`.
    pub rows: Vec<Row>,

    /// Time taken to execute the query and fetch all rows.
    pub execution_time: Duration,
}

impl MaterializedResult {
    /// Creates an empty result (no columns, no rows).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a result, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SheetError::internal(format!(
                "row {index} has {} values but the result has {} columns",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
        })
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Number of columns in the result.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result has no header at all.
    pub fn has_no_columns(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A row of values from a query result.
pub type Row = Vec<CellValue>;

/// A single cell value, as returned by the driver or entered by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// SQL NULL.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Exact decimal (NUMERIC / DECIMAL columns).
    Decimal(Decimal),

    /// Text value.
    Text(String),

    /// Calendar date.
    Date(NaiveDate),

    /// Date with a time of day.
    DateTime(NaiveDateTime),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl CellValue {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true for calendar-date values (with or without a time of day).
    pub fn is_date(&self) -> bool {
        matches!(self, CellValue::Date(_) | CellValue::DateTime(_))
    }

    /// Returns the value as a date-time when it is a calendar date.
    ///
    /// Plain dates are placed at midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(d.and_time(chrono::NaiveTime::MIN)),
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Renders the value as text.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Decimal(d) => d.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }

    /// Text used to pre-fill the cell editor: like the display string, but NULL is empty.
    pub fn to_edit_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_display_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::Decimal(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::DateTime(v)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(v: Vec<u8>) -> Self {
        CellValue::Bytes(v)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => CellValue::Null,
        }
    }
}
