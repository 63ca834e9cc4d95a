//! Terminal User Interface for db-sheet.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::{Action, App};
pub use events::{Event, EventHandler};

use crate::config::{ConnectionParams, ExportConfig};
use crate::error::{Result, SheetError};
use crate::session::Session;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::{debug, info, warn};

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| SheetError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| SheetError::internal(format!("Failed to enter alternate screen: {e}")))?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| SheetError::internal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| SheetError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| SheetError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| SheetError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the operator quits.
    pub async fn run(&mut self, session: &mut Session, mut app: App) -> Result<()> {
        // Restore the terminal before the panic message is printed
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        app.widths.attach(session.grid_mut());
        let result = self.run_event_loop(session, &mut app).await;

        let _ = panic::take_hook();
        result
    }

    async fn run_event_loop(&mut self, session: &mut Session, app: &mut App) -> Result<()> {
        loop {
            app.clear_expired_toast();
            self.draw(session, app)?;

            if !app.running {
                break;
            }

            let event = self.event_handler.next().await?;
            if let Some(action) = app.handle_event(event, session.grid()) {
                self.perform(action, session, app).await?;
            }
        }

        Ok(())
    }

    fn draw(&mut self, session: &Session, app: &mut App) -> Result<()> {
        if app.widths.refresh(session.grid()) {
            debug!("Recomputed column widths");
        }

        self.terminal
            .draw(|frame| ui::render(frame, app, session.grid()))
            .map_err(|e| SheetError::internal(format!("Failed to draw: {e}")))?;
        Ok(())
    }

    /// Carries out an action; operation failures end up in the error box.
    async fn perform(&mut self, action: Action, session: &mut Session, app: &mut App) -> Result<()> {
        match action {
            Action::ExecuteQuery { params, sql } => {
                app.busy = Some("Executing query...".to_string());
                self.draw(session, app)?;

                let outcome = session.execute_query(&params, &sql).await;
                app.busy = None;

                match outcome {
                    Ok(outcome) => {
                        info!(
                            "Loaded {} rows x {} columns in {:?}",
                            outcome.rows, outcome.columns, outcome.execution_time
                        );
                        app.query_succeeded(&outcome);
                    }
                    Err(e) => app.show_error(&e),
                }
            }
            Action::EditCell { row, col, text } => {
                if let Err(e) = session.edit_cell(row, col, text) {
                    warn!("Cell edit rejected: {}", e);
                    app.show_error(&e);
                }
            }
            Action::Save { headers, target } => match session.export(&headers, &target) {
                Ok(path) => app.export_succeeded(&path),
                Err(e) => app.show_error(&e),
            },
            Action::Quit => app.running = false,
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the TUI with the connection fields and query pre-filled.
pub async fn run(
    session: &mut Session,
    params: &ConnectionParams,
    query: Option<String>,
    export: ExportConfig,
) -> Result<()> {
    let app = App::new(params, query, export);
    let mut tui = Tui::new()?;
    tui.run(session, app).await
}
