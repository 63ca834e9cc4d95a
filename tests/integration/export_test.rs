//! Workbook export tests, read back through the `.xlsx` package.

use db_sheet::db::CellValue;
use db_sheet::error::SheetError;
use db_sheet::export::{export_grid, ExportTarget, HeaderSource};
use db_sheet::grid::GridStore;
use chrono::NaiveDate;
use tempfile::TempDir;

use super::read_xlsx_part;

fn people() -> GridStore {
    let mut grid = GridStore::new();
    grid.set_data(
        vec![
            vec![
                CellValue::from("Alice"),
                CellValue::Int(30),
                CellValue::Date(NaiveDate::from_ymd_opt(2021, 4, 12).unwrap()),
            ],
            vec![
                CellValue::from("Bob"),
                CellValue::Null,
                CellValue::Date(NaiveDate::from_ymd_opt(2022, 11, 3).unwrap()),
            ],
        ],
        vec!["Name".to_string(), "Age".to_string(), "Joined".to_string()],
    )
    .unwrap();
    grid
}

/// The `<c>` element for a cell reference such as `B2`.
fn cell<'a>(sheet: &'a str, reference: &str) -> Option<&'a str> {
    let start = sheet.find(&format!("<c r=\"{reference}\""))?;
    let rest = &sheet[start..];
    let open_end = rest.find('>')?;
    if rest[..open_end].ends_with('/') {
        return Some(&rest[..=open_end]);
    }
    let end = rest.find("</c>")?;
    Some(&rest[..end + "</c>".len()])
}

/// Text between `<tag ...>` and `</tag>`, first occurrence.
fn inner_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let start = xml.find(&format!("<{tag}"))?;
    let content = start + xml[start..].find('>')? + 1;
    let end = content + xml[content..].find(&format!("</{tag}>"))?;
    Some(&xml[content..end])
}

fn attribute<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let key = format!(" {name}=\"");
    let start = element.find(&key)? + key.len();
    let end = start + element[start..].find('"')?;
    Some(&element[start..end])
}

/// Shared strings in index order.
fn shared_strings(xml: &str) -> Vec<String> {
    xml.split("<si>")
        .skip(1)
        .filter_map(|si| inner_text(si, "t").map(str::to_string))
        .collect()
}

/// Text of a `t="s"` cell, resolved through the shared string table.
fn string_cell(sheet: &str, strings: &[String], reference: &str) -> Option<String> {
    let element = cell(sheet, reference)?;
    if attribute(element, "t") != Some("s") {
        return None;
    }
    let index: usize = inner_text(element, "v")?.parse().ok()?;
    strings.get(index).cloned()
}

/// Index of the cell format whose number format is `yyyy-mm-dd`.
fn date_xf_index(styles: &str) -> usize {
    let fmt_id = styles
        .split("<numFmt ")
        .skip(1)
        .find(|f| {
            attribute(&format!(" {f}"), "formatCode")
                .is_some_and(|code| code.to_lowercase() == "yyyy-mm-dd")
        })
        .and_then(|f| attribute(&format!(" {f}"), "numFmtId").map(str::to_string))
        .unwrap();

    let cell_xfs = inner_text(styles, "cellXfs").unwrap();
    cell_xfs
        .split("<xf ")
        .skip(1)
        .position(|xf| attribute(&format!(" {xf}"), "numFmtId") == Some(fmt_id.as_str()))
        .unwrap()
}

#[test]
fn test_export_layout() {
    let dir = TempDir::new().unwrap();

    let path = export_grid(
        &people(),
        &HeaderSource::Grid,
        &ExportTarget::new(dir.path(), "people", "People"),
    )
    .unwrap();

    assert_eq!(path, dir.path().join("people.xlsx"));

    let workbook = read_xlsx_part(&path, "xl/workbook.xml");
    assert!(workbook.contains("name=\"People\""));

    let strings = shared_strings(&read_xlsx_part(&path, "xl/sharedStrings.xml"));
    let sheet = read_xlsx_part(&path, "xl/worksheets/sheet1.xml");
    let text = |reference: &str| string_cell(&sheet, &strings, reference);

    // Header row, then the data rows in order and alignment
    assert_eq!(text("A1").as_deref(), Some("Name"));
    assert_eq!(text("B1").as_deref(), Some("Age"));
    assert_eq!(text("C1").as_deref(), Some("Joined"));
    assert_eq!(text("A2").as_deref(), Some("Alice"));
    assert_eq!(text("A3").as_deref(), Some("Bob"));

    // Numbers are written as text
    assert_eq!(text("B2").as_deref(), Some("30"));

    // Only date cells carry the date format
    let date_style = date_xf_index(&read_xlsx_part(&path, "xl/styles.xml")).to_string();
    let joined = cell(&sheet, "C2").unwrap();
    assert_eq!(attribute(joined, "s"), Some(date_style.as_str()));
    assert_eq!(inner_text(joined, "v"), Some("44298"));
    assert!(cell(&sheet, "C3").is_some_and(|c| attribute(c, "s") == Some(date_style.as_str())));
    assert_eq!(attribute(cell(&sheet, "A2").unwrap(), "s"), None);
    assert_eq!(attribute(cell(&sheet, "B2").unwrap(), "s"), None);
    assert_eq!(attribute(cell(&sheet, "A1").unwrap(), "s"), None);

    // Null is a blank cell
    assert!(cell(&sheet, "B3").is_none());
}

#[test]
fn test_export_keeps_operator_extension() {
    let dir = TempDir::new().unwrap();

    let path = export_grid(
        &people(),
        &HeaderSource::Grid,
        &ExportTarget::new(dir.path(), "report.csv", "Data"),
    )
    .unwrap();

    assert_eq!(path, dir.path().join("report.csv"));
    assert!(!dir.path().join("report.csv.xlsx").exists());
    assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
}

#[test]
fn test_export_custom_headers() {
    let dir = TempDir::new().unwrap();
    let headers = HeaderSource::Custom(vec![
        "Full name".to_string(),
        "Years".to_string(),
        "Member since".to_string(),
    ]);

    let path = export_grid(
        &people(),
        &headers,
        &ExportTarget::new(dir.path(), "renamed.xlsx", "Data"),
    )
    .unwrap();

    let strings = read_xlsx_part(&path, "xl/sharedStrings.xml");
    assert!(strings.contains(">Full name<"));
    assert!(strings.contains(">Member since<"));
    assert!(!strings.contains(">Name<"));
}

#[test]
fn test_export_zero_rows_creates_no_file() {
    let dir = TempDir::new().unwrap();
    let mut grid = GridStore::new();
    grid.set_data(Vec::new(), vec!["Name".to_string()]).unwrap();

    let err = export_grid(
        &grid,
        &HeaderSource::Grid,
        &ExportTarget::new(dir.path(), "empty", "Data"),
    )
    .unwrap_err();

    assert!(matches!(err, SheetError::Export(_)));
    assert_eq!(err.message(), "No data to save.");
    assert!(!dir.path().join("empty.xlsx").exists());
}

#[test]
fn test_export_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    std::fs::write(&path, b"stale").unwrap();

    export_grid(
        &people(),
        &HeaderSource::Grid,
        &ExportTarget::new(dir.path(), "people.xlsx", "Data"),
    )
    .unwrap();

    assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
}
