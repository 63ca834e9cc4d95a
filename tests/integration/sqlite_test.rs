//! SQLite data source tests.

use chrono::NaiveDate;
use db_sheet::db::{CellValue, DataSource, SqlDataSource};
use db_sheet::error::SheetError;
use tempfile::TempDir;

use super::create_people_db;

#[tokio::test]
async fn test_select_people() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;

    let result = SqlDataSource::new()
        .materialize(&params, "SELECT name, age, joined FROM people ORDER BY name")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["name", "age", "joined"]);
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.rows[0][0], CellValue::from("Alice"));
    assert_eq!(result.rows[0][1], CellValue::Int(30));
    assert_eq!(
        result.rows[0][2],
        CellValue::Date(NaiveDate::from_ymd_opt(2021, 4, 12).unwrap())
    );
    assert_eq!(result.rows[2][1], CellValue::Null);
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;

    let result = SqlDataSource::new()
        .materialize(&params, "SELECT name, age FROM people WHERE age > 100")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 0);
    assert_eq!(result.columns, vec!["name", "age"]);
}

#[tokio::test]
async fn test_bad_sql_is_data_access_error() {
    let dir = TempDir::new().unwrap();
    let params = create_people_db(&dir.path().join("people.db")).await;

    let err = SqlDataSource::new()
        .materialize(&params, "SELECT * FROM missing_table")
        .await
        .unwrap_err();

    assert!(matches!(err, SheetError::DataAccess(_)));
    assert!(err.message().contains("missing_table"));
}

#[tokio::test]
async fn test_jdbc_prefix_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.db");
    let mut params = create_people_db(&path).await;
    params.url = format!("jdbc:{}", params.url);

    let result = SqlDataSource::new()
        .materialize(&params, "SELECT COUNT(*) AS n FROM people")
        .await
        .unwrap();

    assert_eq!(result.rows, vec![vec![CellValue::Int(3)]]);
}

#[tokio::test]
async fn test_unsupported_scheme() {
    let params = db_sheet::config::ConnectionParams::new("oracle://localhost:1521/xe", "", "");

    let err = SqlDataSource::new()
        .materialize(&params, "SELECT 1 FROM dual")
        .await
        .unwrap_err();

    assert!(matches!(err, SheetError::DataAccess(_)));
}
