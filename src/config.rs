//! Configuration management for db-sheet.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named database connections, grid header policy and
//! export defaults.

use crate::error::{Result, SheetError};
use crate::grid::HeaderPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Prefix used by JDBC-style URLs (`jdbc:mysql://...`).
const JDBC_PREFIX: &str = "jdbc:";

/// Main configuration structure for db-sheet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Grid display settings.
    #[serde(default)]
    pub grid: GridConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,

    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionParams>,
}

/// Grid display settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GridConfig {
    /// How column labels are derived from result column names.
    #[serde(default)]
    pub header_policy: HeaderPolicy,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prompt for a new label for every column before saving.
    #[serde(default = "default_rename_headers")]
    pub rename_headers: bool,

    /// Name of the single worksheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// File name offered in the save prompt.
    #[serde(default = "default_file_name")]
    pub default_file_name: String,

    /// Directory offered in the save prompt (current directory when unset).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_rename_headers() -> bool {
    true
}

fn default_sheet_name() -> String {
    "Data".to_string()
}

fn default_file_name() -> String {
    "output.xlsx".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            rename_headers: default_rename_headers(),
            sheet_name: default_sheet_name(),
            default_file_name: default_file_name(),
            directory: None,
        }
    }
}

impl ExportConfig {
    /// Returns the directory to offer in the save prompt.
    pub fn directory_or_cwd(&self) -> PathBuf {
        self.directory
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Parameters for one database connection attempt.
///
/// The password is never written back out and never shown in `Debug` output.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConnectionParams {
    /// Database URL (`postgres://`, `mysql://`, `sqlite://`, optionally `jdbc:`-prefixed).
    #[serde(default)]
    pub url: String,

    /// Database user; empty means "use whatever the URL says".
    #[serde(default)]
    pub username: String,

    /// Database password; empty means "use whatever the URL says".
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.display_string())
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .finish()
    }
}

impl ConnectionParams {
    /// Creates connection parameters from the three operator fields.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the URL with surrounding whitespace and any `jdbc:` prefix removed.
    pub fn normalized_url(&self) -> &str {
        let url = self.url.trim();
        url.strip_prefix(JDBC_PREFIX).unwrap_or(url)
    }

    /// Returns the URL scheme (`postgres`, `mysql`, `sqlite`, ...), lower-cased.
    pub fn scheme(&self) -> Option<String> {
        self.normalized_url()
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .filter(|scheme| !scheme.is_empty())
    }

    /// Returns the username if one was supplied.
    pub fn username(&self) -> Option<&str> {
        Some(self.username.trim()).filter(|u| !u.is_empty())
    }

    /// Returns the password if one was supplied.
    pub fn password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }

    /// Returns true if no URL has been entered.
    pub fn has_url(&self) -> bool {
        !self.normalized_url().is_empty()
    }

    /// Merges another set of parameters into this one; non-empty fields of `other` win.
    pub fn merge(&mut self, other: &ConnectionParams) {
        if !other.url.trim().is_empty() {
            self.url = other.url.clone();
        }
        if !other.username.trim().is_empty() {
            self.username = other.username.clone();
        }
        if !other.password.is_empty() {
            self.password = other.password.clone();
        }
    }

    /// Fills empty fields from `DATABASE_URL`, `DBSHEET_USER` and `DBSHEET_PASSWORD`.
    pub fn apply_env_defaults(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.username.trim().is_empty() {
            if let Ok(user) = std::env::var("DBSHEET_USER") {
                self.username = user;
            }
        }
        if self.password.is_empty() {
            if let Ok(password) = std::env::var("DBSHEET_PASSWORD") {
                self.password = password;
            }
        }
    }

    /// Returns a display-safe rendering of the URL (password removed).
    pub fn display_string(&self) -> String {
        let raw = self.normalized_url();
        match Url::parse(raw) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(None).is_ok() {
                    url.to_string()
                } else {
                    raw.to_string()
                }
            }
            _ => raw.to_string(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-sheet")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SheetError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionParams> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
