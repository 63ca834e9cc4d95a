//! TUI widgets for db-sheet.

pub mod dialog;
pub mod grid;
pub mod header;
pub mod input;
pub mod toast;
