//! Maps a materialized result onto the grid.

use super::GridStore;
use crate::db::MaterializedResult;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How column labels are derived from result column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Upper-case the first character of each label.
    #[default]
    Capitalize,
    /// Use column names verbatim.
    #[serde(alias = "pass-through", alias = "verbatim")]
    PassThrough,
}

impl HeaderPolicy {
    /// Applies the policy to one column name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Capitalize => capitalize_first(name),
            Self::PassThrough => name.to_string(),
        }
    }

    /// Returns the policy as a string for display and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capitalize => "capitalize",
            Self::PassThrough => "passthrough",
        }
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "capitalize" => Ok(Self::Capitalize),
            "passthrough" | "pass-through" | "verbatim" => Ok(Self::PassThrough),
            _ => Err(format!(
                "Invalid header policy: {s}. Expected: capitalize or passthrough"
            )),
        }
    }
}

/// Upper-cases the first character and leaves the rest alone.
///
/// Characters without an upper-case form (digits, punctuation) are unchanged.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces the grid contents with `result`, labelling columns per `policy`.
///
/// A result without columns produces a 0×0 grid.
pub fn populate(
    store: &mut GridStore,
    result: &MaterializedResult,
    policy: HeaderPolicy,
) -> Result<()> {
    if result.has_no_columns() {
        store.clear();
        return Ok(());
    }

    let labels = result.columns.iter().map(|c| policy.apply(c)).collect();
    store.set_data(result.rows.clone(), labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CellValue;
    use crate::grid::GridEvent;
    use std::sync::{Arc, Mutex};

    fn people() -> MaterializedResult {
        MaterializedResult::new(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec![CellValue::from("Alice"), CellValue::from(30)],
                vec![CellValue::from("Bob"), CellValue::from(25)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("price"), "Price");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("2ndCol"), "2ndCol");
        assert_eq!(capitalize_first("Already"), "Already");
        assert_eq!(capitalize_first("first_name"), "First_name");
        assert_eq!(capitalize_first("émile"), "Émile");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("capitalize".parse::<HeaderPolicy>(), Ok(HeaderPolicy::Capitalize));
        assert_eq!(
            "PassThrough".parse::<HeaderPolicy>(),
            Ok(HeaderPolicy::PassThrough)
        );
        assert!("shout".parse::<HeaderPolicy>().is_err());
    }

    #[test]
    fn test_populate_capitalize() {
        let mut store = GridStore::new();
        populate(&mut store, &people(), HeaderPolicy::Capitalize).unwrap();

        assert_eq!(store.column_names(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(store.row_count(), 2);
        assert_eq!(store.column_count(), 2);
        assert_eq!(store.value_at(1, 1), Some(&CellValue::Int(25)));
    }

    #[test]
    fn test_populate_pass_through() {
        let mut store = GridStore::new();
        populate(&mut store, &people(), HeaderPolicy::PassThrough).unwrap();

        assert_eq!(store.column_names(), &["name".to_string(), "age".to_string()]);
    }

    #[test]
    fn test_populate_empty_result_gives_empty_grid() {
        let mut store = GridStore::new();
        populate(&mut store, &people(), HeaderPolicy::Capitalize).unwrap();

        populate(&mut store, &MaterializedResult::empty(), HeaderPolicy::Capitalize).unwrap();

        assert_eq!(store.row_count(), 0);
        assert_eq!(store.column_count(), 0);
    }

    #[test]
    fn test_populate_header_only_result() {
        let result = MaterializedResult::new(vec!["id".to_string()], vec![]).unwrap();
        let mut store = GridStore::new();

        populate(&mut store, &result, HeaderPolicy::Capitalize).unwrap();

        assert_eq!(store.row_count(), 0);
        assert_eq!(store.column_count(), 1);
        assert_eq!(store.column_name(0), Some("Id"));
    }

    #[test]
    fn test_populate_signals_structure_change() {
        let mut store = GridStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |e| sink.lock().unwrap().push(*e));

        populate(&mut store, &people(), HeaderPolicy::Capitalize).unwrap();

        assert_eq!(*events.lock().unwrap(), vec![GridEvent::StructureChanged]);
    }
}
