//! In-memory data sources for headless runs and tests.

use super::{CellValue, DataSource, MaterializedResult};
use crate::config::ConnectionParams;
use crate::error::{Result, SheetError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::time::Duration;

/// A data source that returns a fixed result for every query.
#[derive(Debug)]
pub struct MockDataSource {
    result: MaterializedResult,
    queries: Mutex<Vec<String>>,
}

impl MockDataSource {
    /// Creates a mock serving a small people table (name, age, joined).
    pub fn new() -> Self {
        Self::with_result(sample_people())
    }

    /// Creates a mock serving the given result.
    pub fn with_result(result: MaterializedResult) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// SQL text of every query received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn materialize(
        &self,
        _params: &ConnectionParams,
        sql: &str,
    ) -> Result<MaterializedResult> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(sql.to_string());
        }
        Ok(self.result.clone())
    }
}

/// A data source whose every query fails with a data access error.
#[derive(Debug, Clone)]
pub struct FailingDataSource {
    message: String,
}

impl FailingDataSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DataSource for FailingDataSource {
    async fn materialize(
        &self,
        _params: &ConnectionParams,
        _sql: &str,
    ) -> Result<MaterializedResult> {
        Err(SheetError::data_access(self.message.clone()))
    }
}

fn sample_people() -> MaterializedResult {
    let joined = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null)
    };

    MaterializedResult {
        columns: vec!["name".to_string(), "age".to_string(), "joined".to_string()],
        rows: vec![
            vec![CellValue::from("Alice"), CellValue::Int(30), joined(2021, 4, 12)],
            vec![CellValue::from("Bob"), CellValue::Int(25), joined(2022, 11, 3)],
            vec![CellValue::from("Carol"), CellValue::Null, joined(2023, 1, 20)],
        ],
        execution_time: Duration::from_millis(1),
    }
}
