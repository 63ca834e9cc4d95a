//! In-memory grid backing the data preview.
//!
//! Holds a rectangular block of cell values plus one label per column and
//! notifies subscribers when either the structure or a single cell changes.

use crate::db::{CellValue, Row};
use crate::error::{Result, SheetError};

/// Change notification emitted by [`GridStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// The whole dataset was replaced; cached widths or column counts are stale.
    StructureChanged,
    /// One cell was replaced in place.
    CellUpdated { row: usize, col: usize },
}

/// Handle returned by [`GridStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GridEvent) + Send>;

/// Rectangular, editable grid of cell values with column labels.
#[derive(Default)]
pub struct GridStore {
    rows: Vec<Row>,
    labels: Vec<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("rows", &self.rows.len())
            .field("labels", &self.labels)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl GridStore {
    /// Creates an empty 0×0 grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (always the number of labels).
    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label of the given column.
    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.labels.get(col).map(String::as_str)
    }

    /// All column labels in order.
    pub fn column_names(&self) -> &[String] {
        &self.labels
    }

    /// Value stored at the given position.
    pub fn value_at(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Every in-range cell is editable.
    pub fn is_cell_editable(&self, row: usize, col: usize) -> bool {
        row < self.row_count() && col < self.column_count()
    }

    /// Replaces a single cell and emits one [`GridEvent::CellUpdated`].
    pub fn set_value_at(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        let (rows, cols) = (self.row_count(), self.column_count());
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| {
                SheetError::internal(format!(
                    "cell ({row}, {col}) is outside the {rows}x{cols} grid"
                ))
            })?;

        *cell = value;
        self.notify(GridEvent::CellUpdated { row, col });
        Ok(())
    }

    /// Replaces the whole dataset and emits [`GridEvent::StructureChanged`].
    ///
    /// Rejects rows whose length differs from the label count, leaving the
    /// store untouched.
    pub fn set_data(&mut self, rows: Vec<Row>, labels: Vec<String>) -> Result<()> {
        if let Some(index) = rows.iter().position(|r| r.len() != labels.len()) {
            return Err(SheetError::internal(format!(
                "grid row {index} has {} cells but there are {} column labels",
                rows[index].len(),
                labels.len()
            )));
        }

        self.rows = rows;
        self.labels = labels;
        self.notify(GridEvent::StructureChanged);
        Ok(())
    }

    /// Empties the grid to 0×0.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.labels.clear();
        self.notify(GridEvent::StructureChanged);
    }

    /// Registers a change listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener; returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: GridEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(store: &mut GridStore) -> Arc<Mutex<Vec<GridEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |e| sink.lock().unwrap().push(*e));
        events
    }

    fn sample() -> GridStore {
        let mut store = GridStore::new();
        store
            .set_data(
                vec![
                    vec![CellValue::from("Alice"), CellValue::from(30)],
                    vec![CellValue::from("Bob"), CellValue::from(25)],
                ],
                vec!["Name".to_string(), "Age".to_string()],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_empty_store_is_safe() {
        let store = GridStore::new();
        assert_eq!(store.row_count(), 0);
        assert_eq!(store.column_count(), 0);
        assert_eq!(store.column_name(0), None);
        assert_eq!(store.value_at(0, 0), None);
        assert!(!store.is_cell_editable(0, 0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_accessors() {
        let store = sample();
        assert_eq!(store.row_count(), 2);
        assert_eq!(store.column_count(), 2);
        assert_eq!(store.column_name(1), Some("Age"));
        assert_eq!(store.value_at(1, 0), Some(&CellValue::from("Bob")));
        assert!(store.is_cell_editable(1, 1));
        assert!(!store.is_cell_editable(2, 0));
    }

    #[test]
    fn test_set_value_emits_exactly_one_cell_event() {
        let mut store = sample();
        let events = recorder(&mut store);

        store.set_value_at(0, 1, CellValue::from("31")).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![GridEvent::CellUpdated { row: 0, col: 1 }]
        );
        assert_eq!(store.value_at(0, 1), Some(&CellValue::from("31")));
        assert_eq!(store.value_at(0, 0), Some(&CellValue::from("Alice")));
        assert_eq!(store.value_at(1, 0), Some(&CellValue::from("Bob")));
        assert_eq!(store.value_at(1, 1), Some(&CellValue::from(25)));
    }

    #[test]
    fn test_set_value_out_of_range() {
        let mut store = sample();
        let events = recorder(&mut store);

        let err = store.set_value_at(5, 0, CellValue::Null).unwrap_err();

        assert!(matches!(err, SheetError::Internal(_)));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_data_emits_structure_changed() {
        let mut store = sample();
        let events = recorder(&mut store);

        store
            .set_data(vec![vec![CellValue::Int(1)]], vec!["Id".to_string()])
            .unwrap();

        assert_eq!(*events.lock().unwrap(), vec![GridEvent::StructureChanged]);
        assert_eq!(store.column_count(), 1);
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn test_set_data_rejects_ragged_rows() {
        let mut store = sample();
        let events = recorder(&mut store);

        let result = store.set_data(
            vec![vec![CellValue::Int(1), CellValue::Int(2)]],
            vec!["Only".to_string()],
        );

        assert!(result.is_err());
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(store.row_count(), 2);
        assert_eq!(store.column_name(0), Some("Name"));
    }

    #[test]
    fn test_clear() {
        let mut store = sample();
        let events = recorder(&mut store);

        store.clear();

        assert_eq!(store.row_count(), 0);
        assert_eq!(store.column_count(), 0);
        assert_eq!(*events.lock().unwrap(), vec![GridEvent::StructureChanged]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = sample();
        let events = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&events);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.clear();

        assert_eq!(*events.lock().unwrap(), 0);
    }
}
