//! Logging setup for db-sheet.
//!
//! The terminal UI owns the screen, so interactive runs log to a file;
//! headless runs log to stderr.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging for the terminal UI.
///
/// Writes to `db-sheet.log` under the platform state directory, truncated
/// on every run. Logging is skipped if the file cannot be created.
pub fn init_file_logging() {
    let log_path = get_log_path();

    // Ensure parent directory exists
    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            // No logging at all; stderr output would draw over the TUI
            return;
        }
    }

    // Truncated on each run so the file never grows unbounded
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false) // No ANSI colors in file output
        .init();
}

/// Initializes logging for headless runs.
///
/// Stdout carries the run summary, so log lines go to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path for the log file.
///
/// State directory first (`~/.local/state/db-sheet/db-sheet.log` on Linux),
/// then the config directory, then the temp directory.
pub fn get_log_path() -> PathBuf {
    // XDG_STATE_HOME on Linux, then the config directory
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("db-sheet").join("db-sheet.log"))
        // Last resort: temp directory
        .unwrap_or_else(|| std::env::temp_dir().join("db-sheet.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        assert!(get_log_path().is_absolute());
    }

    #[test]
    fn test_log_path_file_name() {
        assert!(get_log_path().ends_with("db-sheet.log"));
    }
}
