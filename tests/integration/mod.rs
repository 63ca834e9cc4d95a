//! Integration tests for db-sheet.

pub mod export_test;
pub mod server_test;
pub mod session_test;
pub mod sqlite_test;

use std::path::Path;
use std::str::FromStr;

use db_sheet::config::ConnectionParams;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};

/// Creates a SQLite database at `path` holding a small people table.
pub async fn create_people_db(path: &Path) -> ConnectionParams {
    let url = format!("sqlite://{}", path.display());
    let mut conn = SqliteConnectOptions::from_str(&url)
        .unwrap()
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();

    for statement in [
        "CREATE TABLE people (name TEXT NOT NULL, age INTEGER, joined DATE)",
        "INSERT INTO people VALUES ('Alice', 30, '2021-04-12')",
        "INSERT INTO people VALUES ('Bob', 25, '2022-11-03')",
        "INSERT INTO people VALUES ('Carol', NULL, '2023-01-20')",
    ] {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();

    ConnectionParams::new(url, "", "")
}

/// Reads one part of an `.xlsx` package as text.
pub fn read_xlsx_part(path: &Path, part: &str) -> String {
    use std::io::Read;

    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(part).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}
