//! Event handling for the TUI.
//!
//! Polls crossterm on a blocking thread so the async runtime stays free.

use crate::error::{Result, SheetError};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;

/// Application events.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}

impl From<CrosstermEvent> for Event {
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) => Event::Key(key),
            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
            _ => Event::Tick,
        }
    }
}

/// Handles terminal events.
pub struct EventHandler {
    /// Timeout for polling events.
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Creates a new event handler with a custom tick rate.
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Waits up to one tick for the next event.
    pub async fn next(&self) -> Result<Event> {
        let tick_rate = self.tick_rate;
        tokio::task::spawn_blocking(move || poll_once(tick_rate))
            .await
            .map_err(|e| SheetError::internal(format!("Event polling task failed: {e}")))?
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn poll_once(tick_rate: Duration) -> Result<Event> {
    if event::poll(tick_rate)
        .map_err(|e| SheetError::internal(format!("Failed to poll events: {e}")))?
    {
        let event =
            event::read().map_err(|e| SheetError::internal(format!("Failed to read event: {e}")))?;
        Ok(event.into())
    } else {
        Ok(Event::Tick)
    }
}
