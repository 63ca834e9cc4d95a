//! Tests against a PostgreSQL or MySQL server named by DATABASE_URL.

use db_sheet::config::ConnectionParams;
use db_sheet::db::{CellValue, DataSource, SqlDataSource};
use db_sheet::error::SheetError;

/// Helper to get test connection parameters from the environment.
fn get_test_params() -> Option<ConnectionParams> {
    let url = std::env::var("DATABASE_URL").ok()?;
    if url.starts_with("sqlite") {
        return None;
    }
    Some(ConnectionParams::new(url, "", ""))
}

#[tokio::test]
async fn test_server_select_literals() {
    let Some(params) = get_test_params() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = SqlDataSource::new()
        .materialize(&params, "SELECT 1 AS num, 'hello' AS greeting")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["num", "greeting"]);
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0][1], CellValue::from("hello"));
}

#[tokio::test]
async fn test_server_bad_sql() {
    let Some(params) = get_test_params() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = SqlDataSource::new()
        .materialize(&params, "SELECT * FROM definitely_not_a_table")
        .await
        .unwrap_err();

    assert!(matches!(err, SheetError::DataAccess(_)));
}
