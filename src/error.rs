//! Error types for db-sheet.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for db-sheet operations.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Failures reaching or querying the database (bad URL, auth failed, bad SQL, etc.)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Failures producing the output workbook (empty grid, unwritable path, etc.)
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors (invalid config file, bad CLI combination, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal setup, broken invariants, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SheetError {
    /// Creates a data access error with the given message.
    pub fn data_access(msg: impl Into<String>) -> Self {
        Self::DataAccess(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DataAccess(_) => "Data Access Error",
            Self::Export(_) => "Export Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::DataAccess(m) | Self::Export(m) | Self::Config(m) | Self::Internal(m) => m,
        }
    }
}

/// Result type alias using SheetError.
pub type Result<T> = std::result::Result<T, SheetError>;
