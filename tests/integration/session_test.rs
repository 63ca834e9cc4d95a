//! End-to-end session tests: query, edit, export.

use db_sheet::db::{CellValue, SqlDataSource};
use db_sheet::export::{ExportTarget, HeaderSource};
use db_sheet::grid::HeaderPolicy;
use db_sheet::headless;
use db_sheet::session::Session;
use tempfile::TempDir;

use super::{create_people_db, read_xlsx_part};

#[tokio::test]
async fn test_query_edit_export() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;
    let mut session = Session::new(Box::new(SqlDataSource::new()), HeaderPolicy::Capitalize);

    let outcome = session
        .execute_query(&params, "SELECT name, age FROM people ORDER BY name")
        .await
        .unwrap();
    assert_eq!((outcome.rows, outcome.columns), (3, 2));
    assert_eq!(session.grid().column_names(), ["Name", "Age"]);

    session.edit_cell(0, 0, "Alicia").unwrap();
    assert_eq!(session.grid().value_at(0, 0), Some(&CellValue::from("Alicia")));

    let path = session
        .export(
            &HeaderSource::Grid,
            &ExportTarget::new(dir.path(), "edited", "Data"),
        )
        .unwrap();

    let strings = read_xlsx_part(&path, "xl/sharedStrings.xml");
    assert!(strings.contains(">Alicia<"));
    assert!(!strings.contains(">Alice<"));
}

#[tokio::test]
async fn test_failed_query_keeps_grid() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;
    let mut session = Session::new(Box::new(SqlDataSource::new()), HeaderPolicy::PassThrough);

    session
        .execute_query(&params, "SELECT name FROM people")
        .await
        .unwrap();
    assert!(session
        .execute_query(&params, "SELECT nope FROM people")
        .await
        .is_err());

    assert_eq!(session.grid().row_count(), 3);
    assert_eq!(session.grid().column_names(), ["name"]);
}

#[tokio::test]
async fn test_headless_run() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;
    let mut session = Session::new(Box::new(SqlDataSource::new()), HeaderPolicy::Capitalize);
    let target = ExportTarget::from_path(&dir.path().join("report"), "Report");

    let summary = headless::run(
        &mut session,
        &params,
        "SELECT name, joined FROM people",
        HeaderSource::Grid,
        &target,
    )
    .await
    .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.headers, vec!["Name", "Joined"]);
    assert_eq!(summary.sheet, "Report");
    assert!(summary.path.ends_with("report.xlsx"));
    assert!(summary.path.exists());
}
