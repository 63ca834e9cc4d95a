//! Editable data grid widget.
//!
//! Renders the grid store with a highlighted header row, a cell cursor and
//! auto-sized columns. Column widths are cached and recomputed only after
//! the store reports a change.

use crate::db::CellValue;
use crate::grid::{GridStore, SubscriptionId};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Space taken by the separator between columns.
const SEPARATOR_WIDTH: usize = 3;

/// Calculates the display width of each column from labels and values.
pub fn calculate_column_widths(grid: &GridStore) -> Vec<usize> {
    let mut widths: Vec<usize> = grid
        .column_names()
        .iter()
        .map(|name| name.chars().count().max(MIN_COLUMN_WIDTH))
        .collect();

    for row in grid.rows() {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.to_display_string().chars().count());
        }
    }

    widths.into_iter().map(|w| w.min(MAX_COLUMN_WIDTH)).collect()
}

/// Truncates a string to fit within the given width, adding ellipsis if needed.
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}

/// Column widths kept in sync with a grid store through its change events.
#[derive(Debug)]
pub struct WidthCache {
    widths: Vec<usize>,
    stale: Arc<AtomicBool>,
    subscription: Option<SubscriptionId>,
}

impl Default for WidthCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WidthCache {
    pub fn new() -> Self {
        Self {
            widths: Vec::new(),
            stale: Arc::new(AtomicBool::new(true)),
            subscription: None,
        }
    }

    /// Subscribes to `grid` so any change marks the cache stale.
    pub fn attach(&mut self, grid: &mut GridStore) {
        if let Some(id) = self.subscription.take() {
            grid.unsubscribe(id);
        }
        let stale = Arc::clone(&self.stale);
        self.subscription = Some(grid.subscribe(move |_| stale.store(true, Ordering::Release)));
        self.stale.store(true, Ordering::Release);
    }

    /// Recomputes widths if the grid changed; returns true when it did.
    pub fn refresh(&mut self, grid: &GridStore) -> bool {
        if self.stale.swap(false, Ordering::AcqRel) {
            self.widths = calculate_column_widths(grid);
            true
        } else {
            false
        }
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }
}

/// First column to draw so that `cursor_col` fits in `available` cells.
pub fn first_visible_column(widths: &[usize], cursor_col: usize, available: usize) -> usize {
    let mut used = 0;
    let mut first = cursor_col.min(widths.len().saturating_sub(1));
    for col in (0..=first).rev() {
        let width = widths.get(col).copied().unwrap_or(MIN_COLUMN_WIDTH) + SEPARATOR_WIDTH;
        if used + width > available && col != first {
            break;
        }
        used += width;
        first = col;
    }
    first
}

/// Widget drawing the grid.
pub struct DataGrid<'a> {
    grid: &'a GridStore,
    widths: &'a [usize],
    cursor: (usize, usize),
    focused: bool,
    editing: Option<&'a str>,
}

impl<'a> DataGrid<'a> {
    pub fn new(grid: &'a GridStore, widths: &'a [usize], cursor: (usize, usize)) -> Self {
        Self {
            grid,
            widths,
            cursor,
            focused: false,
            editing: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Shows `text` in the cursor cell instead of its stored value.
    pub fn editing(mut self, text: Option<&'a str>) -> Self {
        self.editing = text;
        self
    }

    fn width_of(&self, col: usize) -> usize {
        self.widths.get(col).copied().unwrap_or(MIN_COLUMN_WIDTH)
    }

    fn visible_columns(&self, available: usize) -> Vec<usize> {
        let first = first_visible_column(self.widths, self.cursor.1, available);
        let mut used = 0;
        let mut columns = Vec::new();
        for col in first..self.grid.column_count() {
            let width = self.width_of(col) + SEPARATOR_WIDTH;
            if used + width > available && !columns.is_empty() {
                break;
            }
            used += width;
            columns.push(col);
        }
        columns
    }

    fn header_line(&self, columns: &[usize]) -> Line<'a> {
        let style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::new();
        for &col in columns {
            let width = self.width_of(col);
            let name = truncate(self.grid.column_name(col).unwrap_or_default(), width);
            spans.push(Span::styled(format!(" {name:width$} "), style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    }

    fn separator_line(&self, columns: &[usize]) -> Line<'a> {
        let mut border = String::new();
        for &col in columns {
            border.push_str(&"─".repeat(self.width_of(col) + 2));
            border.push('┼');
        }
        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    fn data_line(&self, row: usize, columns: &[usize]) -> Line<'a> {
        let mut spans = Vec::new();
        for &col in columns {
            let width = self.width_of(col);
            let is_cursor = self.focused && (row, col) == self.cursor;
            let value = self.grid.value_at(row, col);

            let display = match (is_cursor, self.editing) {
                (true, Some(text)) => text.to_string(),
                _ => value.map(CellValue::to_display_string).unwrap_or_default(),
            };
            let padded = format!(" {:width$} ", truncate(&display, width));

            let mut style = if value.is_some_and(CellValue::is_null) {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            if is_cursor {
                style = if self.editing.is_some() {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    style.add_modifier(Modifier::REVERSED)
                };
            }

            spans.push(Span::styled(padded, style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    }
}

impl Widget for DataGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Results ({} row{}) ",
            self.grid.row_count(),
            if self.grid.row_count() == 1 { "" } else { "s" }
        );
        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.grid.column_count() == 0 {
            let hint = Span::styled(
                "(no data; run a query with F5)",
                Style::default().fg(Color::DarkGray),
            );
            buf.set_span(inner.x, inner.y, &hint, inner.width);
            return;
        }

        let columns = self.visible_columns(inner.width as usize);
        let mut lines = vec![self.header_line(&columns), self.separator_line(&columns)];

        let visible_rows = (inner.height as usize).saturating_sub(lines.len()).max(1);
        let first_row = self.cursor.0.saturating_sub(visible_rows - 1);
        let last_row = (first_row + visible_rows).min(self.grid.row_count());
        lines.extend((first_row..last_row).map(|row| self.data_line(row, &columns)));

        for (i, line) in lines.iter().enumerate().take(inner.height as usize) {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}
