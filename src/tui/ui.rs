//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{
    dialog,
    grid::DataGrid,
    header::Header,
    input::{InputField, QueryEditor},
    toast::Toast,
};
use crate::grid::GridStore;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Height of the query editor including borders.
const QUERY_HEIGHT: u16 = 6;

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App, grid: &GridStore) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Length(3),            // Connection fields
            Constraint::Length(QUERY_HEIGHT), // Query editor
            Constraint::Min(3),               // Grid
            Constraint::Length(1),            // Key hints
        ])
        .split(area);

    let connection_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(main_layout[1]);

    render_header(frame, main_layout[0], app);
    render_connection(frame, &connection_layout, app);
    render_query(frame, main_layout[2], app);
    render_grid(frame, main_layout[3], app, grid);
    render_footer(frame, main_layout[4], app);

    if let Some(prompt) = &app.prompt {
        let (x, y) = dialog::render_prompt(
            frame,
            &prompt.title,
            &prompt.message,
            &prompt.input.text,
            prompt.input.cursor,
        );
        frame.set_cursor_position(Position::new(x, y));
    }

    if let Some(error) = &app.error {
        dialog::render_error(frame, &error.title, &error.message);
    }

    if let Some(message) = app.toast() {
        frame.render_widget(Toast::new(message), Toast::area(area, message));
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let info = app.connection_info();
    let widget = Header::new(Some(&info), app.busy.as_deref());
    frame.render_widget(widget, area);
}

fn render_connection(frame: &mut Frame, areas: &[Rect], app: &App) {
    let fields = [
        (Focus::Url, "URL", &app.url, false),
        (Focus::User, "User", &app.user, false),
        (Focus::Password, "Password", &app.password, true),
    ];

    for ((focus, title, input, masked), &area) in fields.into_iter().zip(areas) {
        let focused = app.focus == focus && app.is_idle();
        let mut field = InputField::new(title, &input.text, input.cursor, focused);
        if masked {
            field = field.masked();
        }
        if focused {
            let (x, y) = field.cursor_position(area);
            frame.set_cursor_position(Position::new(x, y));
        }
        frame.render_widget(field, area);
    }
}

fn render_query(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Query && app.is_idle();
    let (line, col) = app.query.cursor_line_col();
    frame.render_widget(QueryEditor::new(&app.query.text, line, focused), area);

    if focused {
        let scroll = QueryEditor::scroll_offset(line, area);
        let x = (area.x + 1 + col as u16).min(area.right().saturating_sub(2));
        let y = area.y + 1 + (line - scroll) as u16;
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn render_grid(frame: &mut Frame, area: Rect, app: &App, grid: &GridStore) {
    let editing = app.editor.as_ref().map(|e| e.input.text.as_str());
    let widget = DataGrid::new(grid, app.widths.widths(), (app.cursor.row, app.cursor.col))
        .focused(app.focus == Focus::Grid)
        .editing(editing);
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = if app.editor.is_some() {
        &[("Enter", "commit"), ("Esc", "cancel")]
    } else if app.focus == Focus::Grid {
        &[
            ("Arrows", "move"),
            ("Enter", "edit"),
            ("F5", "execute"),
            ("Ctrl+S", "save"),
            ("Tab", "next field"),
            ("Ctrl+Q", "quit"),
        ]
    } else {
        &[
            ("F5", "execute"),
            ("Ctrl+S", "save"),
            ("Tab", "next field"),
            ("Ctrl+Q", "quit"),
        ]
    };

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key}"), key_style));
        spans.push(Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
