//! db-sheet - run a SQL query, edit the rows in a grid, save them to Excel.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod grid;
pub mod headless;
pub mod logging;
pub mod session;
pub mod tui;
