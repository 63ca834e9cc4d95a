//! Spreadsheet export for db-sheet.
//!
//! Writes the grid to a single-sheet `.xlsx` workbook. The workbook is
//! assembled in memory and written to disk in one step, so nothing is
//! created when planning or assembly fails.

mod plan;

pub use plan::{plan_sheet, HeaderSource, PlannedCell, SheetPlan};

use crate::error::{Result, SheetError};
use crate::grid::GridStore;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};
use tracing::info;

/// Number format applied to date cells.
pub const DATE_FORMAT: &str = "yyyy-MM-dd";

const XLSX_EXTENSION: &str = "xlsx";

/// Destination of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub directory: PathBuf,
    pub file_name: String,
    pub sheet_name: String,
}

impl ExportTarget {
    pub fn new(
        directory: impl Into<PathBuf>,
        file_name: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// Builds a target from a full output path.
    pub fn from_path(path: &Path, sheet_name: impl Into<String>) -> Self {
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(directory, file_name, sheet_name)
    }

    /// Full path of the file to write; `.xlsx` is appended only to a name with no extension.
    pub fn path(&self) -> Result<PathBuf> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(SheetError::export(
                "Invalid file name. Please provide a valid name.",
            ));
        }

        // A name with any extension is used exactly as given
        let path = self.directory.join(name);
        if path.extension().is_some() {
            return Ok(path);
        }
        Ok(self.directory.join(format!("{name}.{XLSX_EXTENSION}")))
    }
}

/// Writes the grid to `target` and returns the path written.
pub fn export_grid(
    store: &GridStore,
    headers: &HeaderSource,
    target: &ExportTarget,
) -> Result<PathBuf> {
    let plan = plan_sheet(store, headers)?;
    let path = target.path()?;

    let bytes = render_workbook(&plan, &target.sheet_name).map_err(map_xlsx_error)?;

    std::fs::write(&path, bytes).map_err(|e| {
        SheetError::export(format!("Cannot write {}: {e}", path.display()))
    })?;

    info!(
        "Exported {} rows x {} columns to {}",
        plan.rows.len(),
        plan.header.len(),
        path.display()
    );
    Ok(path)
}

/// Builds the workbook bytes for a plan.
pub fn render_workbook(
    plan: &SheetPlan,
    sheet_name: &str,
) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, label) in plan.header.iter().enumerate() {
        worksheet.write_string(0, column_index(col)?, label)?;
    }

    for (index, cells) in plan.rows.iter().enumerate() {
        let row = row_index(index + 1)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = column_index(col)?;
            match cell {
                PlannedCell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                PlannedCell::Date(dt) => {
                    worksheet.write_datetime_with_format(row, col, dt, &date_format)?;
                }
                PlannedCell::Blank => {}
            }
        }
    }

    workbook.save_to_buffer()
}

fn row_index(row: usize) -> std::result::Result<u32, XlsxError> {
    u32::try_from(row).map_err(|_| XlsxError::RowColumnLimitError)
}

fn column_index(col: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn map_xlsx_error(error: XlsxError) -> SheetError {
    SheetError::export(format!("Cannot build workbook: {error}"))
}
