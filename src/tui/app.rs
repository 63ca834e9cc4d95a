//! Application state for the TUI.
//!
//! Key handling is pure state manipulation: anything that needs the
//! database or the filesystem comes back as an [`Action`] for the runner.

use super::widgets::grid::WidthCache;
use super::Event;
use crate::config::{ConnectionParams, ExportConfig};
use crate::error::SheetError;
use crate::export::{ExportTarget, HeaderSource};
use crate::grid::GridStore;
use crate::session::QueryOutcome;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// URL offered when nothing is configured.
pub const DEFAULT_URL: &str = "jdbc:mysql://localhost:3306/";

/// Query text offered when none is given.
pub const DEFAULT_QUERY: &str = "SELECT * FROM ";

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Rows moved by PageUp / PageDown in the grid.
const PAGE_SIZE: usize = 10;

/// Which field currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Url,
    User,
    Password,
    #[default]
    Query,
    Grid,
}

impl Focus {
    /// Cycles to the next field.
    pub fn next(self) -> Self {
        match self {
            Self::Url => Self::User,
            Self::User => Self::Password,
            Self::Password => Self::Query,
            Self::Query => Self::Grid,
            Self::Grid => Self::Url,
        }
    }

    /// Cycles to the previous field.
    pub fn prev(self) -> Self {
        match self {
            Self::Url => Self::Grid,
            Self::User => Self::Url,
            Self::Password => Self::User,
            Self::Query => Self::Password,
            Self::Grid => Self::Query,
        }
    }
}

/// Input state for text editing.
///
/// The cursor is a character index, so multi-byte text edits correctly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Clears the input and returns the previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Line and column of the cursor in multi-line text.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);
        (line, col)
    }

    /// Applies a plain editing key. Returns false if the key was not used.
    fn edit(&mut self, key: KeyEvent, multi_line: bool) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert(c)
            }
            KeyCode::Enter if multi_line => self.insert('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

/// Work the runner must carry out on behalf of the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ExecuteQuery {
        params: ConnectionParams,
        sql: String,
    },
    EditCell {
        row: usize,
        col: usize,
        text: String,
    },
    Save {
        headers: HeaderSource,
        target: ExportTarget,
    },
    Quit,
}

/// Selected grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    pub row: usize,
    pub col: usize,
}

impl GridCursor {
    /// Moves by the given offsets, staying inside a `rows` x `cols` grid.
    pub fn move_by(&mut self, d_row: isize, d_col: isize, rows: usize, cols: usize) {
        self.row = self
            .row
            .saturating_add_signed(d_row)
            .min(rows.saturating_sub(1));
        self.col = self
            .col
            .saturating_add_signed(d_col)
            .min(cols.saturating_sub(1));
    }
}

/// In-place editor for one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    pub row: usize,
    pub col: usize,
    pub input: InputState,
}

/// A modal text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub input: InputState,
}

/// A modal error box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveStep {
    Header(usize),
    Directory,
    FileName,
}

/// Progress through the save prompts.
#[derive(Debug, Clone)]
struct SaveFlow {
    step: SaveStep,
    original: Vec<String>,
    labels: Vec<String>,
    directory: String,
}

impl SaveFlow {
    fn prompt(&self, export: &ExportConfig) -> Prompt {
        match self.step {
            SaveStep::Header(col) => {
                let current = self.original.get(col).cloned().unwrap_or_default();
                Prompt {
                    title: format!("Rename Header {}/{}", col + 1, self.original.len()),
                    message: format!("Enter new header for column '{current}':"),
                    input: InputState::with_text(current),
                }
            }
            SaveStep::Directory => Prompt {
                title: "Save to Excel".to_string(),
                message: "Directory to save the file in:".to_string(),
                input: InputState::with_text(self.directory.clone()),
            },
            SaveStep::FileName => Prompt {
                title: "Save to Excel".to_string(),
                message: "Enter the file name:".to_string(),
                input: InputState::with_text(export.default_file_name.clone()),
            },
        }
    }

    fn headers(self) -> HeaderSource {
        if self.labels == self.original {
            HeaderSource::Grid
        } else {
            HeaderSource::Custom(self.labels)
        }
    }
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current focus field.
    pub focus: Focus,
    pub url: InputState,
    pub user: InputState,
    pub password: InputState,
    pub query: InputState,
    pub cursor: GridCursor,
    pub editor: Option<CellEditor>,
    pub prompt: Option<Prompt>,
    pub error: Option<ErrorDialog>,
    /// Activity shown in the header while an operation runs.
    pub busy: Option<String>,
    pub widths: WidthCache,
    toast: Option<(String, Instant)>,
    save: Option<SaveFlow>,
    export: ExportConfig,
}

impl App {
    /// Creates the UI state with pre-filled connection fields and query.
    pub fn new(params: &ConnectionParams, query: Option<String>, export: ExportConfig) -> Self {
        let url = if params.url.trim().is_empty() {
            DEFAULT_URL.to_string()
        } else {
            params.url.clone()
        };

        Self {
            running: true,
            focus: Focus::default(),
            url: InputState::with_text(url),
            user: InputState::with_text(params.username.clone()),
            password: InputState::with_text(params.password.clone()),
            query: InputState::with_text(query.unwrap_or_else(|| DEFAULT_QUERY.to_string())),
            cursor: GridCursor::default(),
            editor: None,
            prompt: None,
            error: None,
            busy: None,
            widths: WidthCache::new(),
            toast: None,
            save: None,
            export,
        }
    }

    /// Connection parameters from the three fields.
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams::new(&self.url.text, &self.user.text, &self.password.text)
    }

    /// Display-safe connection target for the header.
    pub fn connection_info(&self) -> String {
        self.connection_params().display_string()
    }

    /// True when no modal, editor or running operation owns the keyboard.
    pub fn is_idle(&self) -> bool {
        self.prompt.is_none() && self.error.is_none() && self.editor.is_none() && self.busy.is_none()
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some((message.into(), Instant::now()));
    }

    /// Drops the toast once it has been shown long enough.
    pub fn clear_expired_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    pub fn show_error(&mut self, error: &SheetError) {
        self.error = Some(ErrorDialog {
            title: error.category().to_string(),
            message: error.message().to_string(),
        });
    }

    /// Records a successful query.
    pub fn query_succeeded(&mut self, _outcome: &QueryOutcome) {
        self.cursor = GridCursor::default();
        self.editor = None;
        self.focus = Focus::Grid;
        self.show_toast("Data retrieved from the database successfully!");
    }

    /// Records a successful export.
    pub fn export_succeeded(&mut self, _path: &Path) {
        self.show_toast("Data saved to Excel successfully!");
    }

    /// Handles an event and returns any work for the runner.
    pub fn handle_event(&mut self, event: Event, grid: &GridStore) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, grid),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, grid: &GridStore) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.running = false;
            return Some(Action::Quit);
        }

        if self.error.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.error = None;
            }
            return None;
        }

        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }

        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }

        match key.code {
            KeyCode::F(5) => return self.execute(),
            KeyCode::Char('r') if ctrl => return self.execute(),
            KeyCode::Char('s') if ctrl => {
                self.begin_save(grid);
                return None;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Url => {
                self.url.edit(key, false);
            }
            Focus::User => {
                self.user.edit(key, false);
            }
            Focus::Password => {
                self.password.edit(key, false);
            }
            Focus::Query => {
                self.query.edit(key, true);
            }
            Focus::Grid => self.handle_grid_key(key, grid),
        }
        None
    }

    fn execute(&mut self) -> Option<Action> {
        if self.busy.is_some() {
            return None;
        }
        Some(Action::ExecuteQuery {
            params: self.connection_params(),
            sql: self.query.text.clone(),
        })
    }

    fn handle_grid_key(&mut self, key: KeyEvent, grid: &GridStore) {
        let (rows, cols) = (grid.row_count(), grid.column_count());
        let page = PAGE_SIZE as isize;

        match key.code {
            KeyCode::Up => self.cursor.move_by(-1, 0, rows, cols),
            KeyCode::Down => self.cursor.move_by(1, 0, rows, cols),
            KeyCode::Left => self.cursor.move_by(0, -1, rows, cols),
            KeyCode::Right => self.cursor.move_by(0, 1, rows, cols),
            KeyCode::PageUp => self.cursor.move_by(-page, 0, rows, cols),
            KeyCode::PageDown => self.cursor.move_by(page, 0, rows, cols),
            KeyCode::Home => self.cursor.col = 0,
            KeyCode::End => self.cursor.col = cols.saturating_sub(1),
            KeyCode::Enter => {
                let GridCursor { row, col } = self.cursor;
                if grid.is_cell_editable(row, col) {
                    let text = grid
                        .value_at(row, col)
                        .map(|v| v.to_edit_string())
                        .unwrap_or_default();
                    self.editor = Some(CellEditor {
                        row,
                        col,
                        input: InputState::with_text(text),
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                None
            }
            KeyCode::Enter => self.editor.take().map(|editor| Action::EditCell {
                row: editor.row,
                col: editor.col,
                text: editor.input.text,
            }),
            _ => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.input.edit(key, false);
                }
                None
            }
        }
    }

    /// Starts the save prompts, or reports that there is nothing to save.
    fn begin_save(&mut self, grid: &GridStore) {
        if grid.row_count() == 0 {
            self.show_error(&SheetError::export("No data to save."));
            return;
        }

        let labels = grid.column_names().to_vec();
        let step = if self.export.rename_headers && !labels.is_empty() {
            SaveStep::Header(0)
        } else {
            SaveStep::Directory
        };
        let flow = SaveFlow {
            step,
            original: labels.clone(),
            labels,
            directory: self.export.directory_or_cwd().display().to_string(),
        };

        self.prompt = Some(flow.prompt(&self.export));
        self.save = Some(flow);
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                self.save = None;
                None
            }
            KeyCode::Enter => {
                let value = self.prompt.take().map(|p| p.input.text).unwrap_or_default();
                self.advance_save(value)
            }
            _ => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.edit(key, false);
                }
                None
            }
        }
    }

    fn advance_save(&mut self, value: String) -> Option<Action> {
        let flow = self.save.as_mut()?;
        let step = flow.step;

        match step {
            SaveStep::Header(col) => {
                if let Some(label) = flow.labels.get_mut(col) {
                    *label = value;
                }
                flow.step = if col + 1 < flow.labels.len() {
                    SaveStep::Header(col + 1)
                } else {
                    SaveStep::Directory
                };
            }
            SaveStep::Directory => {
                flow.directory = value;
                flow.step = SaveStep::FileName;
            }
            SaveStep::FileName => {
                let flow = self.save.take()?;
                let target = ExportTarget::new(
                    PathBuf::from(flow.directory.trim()),
                    value,
                    self.export.sheet_name.clone(),
                );
                return Some(Action::Save {
                    headers: flow.headers(),
                    target,
                });
            }
        }

        self.prompt = Some(flow.prompt(&self.export));
        None
    }
}
