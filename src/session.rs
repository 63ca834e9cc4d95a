//! Operation coordinator shared by the interactive and headless shells.
//!
//! A `Session` owns the data source and the grid. Every operation borrows
//! the session mutably, so only one query or export runs at a time.

use crate::config::ConnectionParams;
use crate::db::{CellValue, DataSource};
use crate::error::Result;
use crate::export::{export_grid, ExportTarget, HeaderSource};
use crate::grid::{populate, GridStore, HeaderPolicy};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Summary of a successful query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    pub rows: usize,
    pub columns: usize,
    pub execution_time: Duration,
}

/// Data source, grid and header policy for one operator.
pub struct Session {
    source: Box<dyn DataSource>,
    grid: GridStore,
    header_policy: HeaderPolicy,
}

impl Session {
    pub fn new(source: Box<dyn DataSource>, header_policy: HeaderPolicy) -> Self {
        Self {
            source,
            grid: GridStore::new(),
            header_policy,
        }
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Mutable access, used to register grid listeners.
    pub fn grid_mut(&mut self) -> &mut GridStore {
        &mut self.grid
    }

    pub fn header_policy(&self) -> HeaderPolicy {
        self.header_policy
    }

    /// Runs `sql` and replaces the grid with the result.
    ///
    /// On failure the grid keeps its previous contents.
    pub async fn execute_query(
        &mut self,
        params: &ConnectionParams,
        sql: &str,
    ) -> Result<QueryOutcome> {
        info!("Executing query against {}", params.display_string());

        let result = match self.source.materialize(params, sql).await {
            Ok(result) => result,
            Err(e) => {
                error!("Query failed: {}", e);
                return Err(e);
            }
        };

        populate(&mut self.grid, &result, self.header_policy)?;

        Ok(QueryOutcome {
            rows: result.row_count(),
            columns: result.column_count(),
            execution_time: result.execution_time,
        })
    }

    /// Stores operator-entered text in a cell.
    pub fn edit_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> Result<()> {
        self.grid
            .set_value_at(row, col, CellValue::Text(text.into()))
    }

    /// Writes the grid to a workbook.
    pub fn export(&mut self, headers: &HeaderSource, target: &ExportTarget) -> Result<PathBuf> {
        export_grid(&self.grid, headers, target).inspect_err(|e| error!("Export failed: {}", e))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("grid", &self.grid)
            .field("header_policy", &self.header_policy)
            .finish()
    }
}
