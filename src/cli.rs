//! Command-line argument parsing for db-sheet.
//!
//! Uses clap derive; connection flags override values from the config file.

use crate::config::{Config, ConnectionParams};
use crate::error::{Result, SheetError};
use crate::grid::HeaderPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Run a SQL query, review the rows in an editable grid, save them to Excel.
#[derive(Parser, Debug)]
#[command(name = "dbsheet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database URL (postgres://, mysql://, sqlite://; a jdbc: prefix is accepted)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Database user
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Query text (pre-fills the editor in interactive mode)
    #[arg(short = 'q', long, value_name = "SQL", conflicts_with = "query_file")]
    pub query: Option<String>,

    /// Read the query text from a file
    #[arg(long, value_name = "PATH")]
    pub query_file: Option<PathBuf>,

    /// How column labels are derived: capitalize or passthrough
    #[arg(long, value_name = "POLICY")]
    pub header_policy: Option<HeaderPolicy>,

    // === Headless mode options ===
    /// Run one query and write one workbook without the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Use the in-memory sample data source instead of a database
    #[arg(long)]
    pub mock_db: bool,

    /// Output workbook path (headless mode)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Comma-separated header labels for the workbook (headless mode)
    #[arg(long, value_name = "LABELS", value_delimiter = ',')]
    pub headers: Option<Vec<String>>,

    /// Worksheet name (defaults to the configured sheet name)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Print the headless summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Returns true if headless mode is enabled.
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Connection fields given on the command line; empty when none were.
    pub fn to_connection_params(&self) -> ConnectionParams {
        ConnectionParams::new(
            self.url.clone().unwrap_or_default(),
            self.user.clone().unwrap_or_default(),
            "",
        )
    }

    /// Resolves connection parameters.
    ///
    /// Precedence: CLI flags, then the named connection (or the default
    /// connection), then `DATABASE_URL` / `DBSHEET_USER` / `DBSHEET_PASSWORD`.
    pub fn resolve_connection(&self, config: &Config) -> Result<ConnectionParams> {
        let mut params = match self.connection_name() {
            Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
                SheetError::config(format!("Connection '{name}' not found in config file"))
            })?,
            None => config.get_connection(None).cloned().unwrap_or_default(),
        };

        params.merge(&self.to_connection_params());
        params.apply_env_defaults();
        Ok(params)
    }

    /// Returns the query text from --query or --query-file.
    pub fn read_query(&self) -> Result<Option<String>> {
        if let Some(query) = &self.query {
            return Ok(Some(query.clone()));
        }

        match &self.query_file {
            Some(path) => std::fs::read_to_string(path).map(Some).map_err(|e| {
                SheetError::config(format!(
                    "Failed to read query file {}: {e}",
                    path.display()
                ))
            }),
            None => Ok(None),
        }
    }

    /// Header policy from the command line, falling back to the config file.
    pub fn header_policy_or(&self, config: &Config) -> HeaderPolicy {
        self.header_policy.unwrap_or(config.grid.header_policy)
    }

    /// Validates headless mode arguments.
    /// Returns an error message if validation fails.
    pub fn validate_headless(&self) -> std::result::Result<(), String> {
        if !self.headless {
            if self.output.is_some() || self.headers.is_some() || self.json {
                return Err("--output, --headers and --json require --headless".to_string());
            }
            return Ok(());
        }

        if self.query.is_none() && self.query_file.is_none() {
            return Err("--headless requires --query or --query-file".to_string());
        }

        if self.output.is_none() {
            return Err("--headless requires --output".to_string());
        }

        if let Some(headers) = &self.headers {
            if headers.iter().any(|h| h.trim().is_empty()) {
                return Err("--headers must not contain empty labels".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_connection_flags() {
        let cli = parse_args(&[
            "dbsheet",
            "--url",
            "jdbc:mysql://localhost:3306/shop",
            "-U",
            "root",
        ]);
        assert_eq!(cli.url, Some("jdbc:mysql://localhost:3306/shop".to_string()));
        assert_eq!(cli.user, Some("root".to_string()));
    }

    #[test]
    fn test_parse_named_connection() {
        let cli = parse_args(&["dbsheet", "--connection", "prod"]);
        assert_eq!(cli.connection_name(), Some("prod"));

        let cli = parse_args(&["dbsheet", "-c", "staging"]);
        assert_eq!(cli.connection_name(), Some("staging"));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["dbsheet", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_parse_header_policy() {
        let cli = parse_args(&["dbsheet", "--header-policy", "passthrough"]);
        assert_eq!(cli.header_policy, Some(HeaderPolicy::PassThrough));

        let result = Cli::try_parse_from(["dbsheet", "--header-policy", "shout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_header_policy_falls_back_to_config() {
        let cli = parse_args(&["dbsheet"]);
        let mut config = Config::default();
        config.grid.header_policy = HeaderPolicy::PassThrough;
        assert_eq!(cli.header_policy_or(&config), HeaderPolicy::PassThrough);
    }

    #[test]
    fn test_parse_headers_list() {
        let cli = parse_args(&["dbsheet", "--headers", "Full name,Age"]);
        assert_eq!(
            cli.headers,
            Some(vec!["Full name".to_string(), "Age".to_string()])
        );
    }

    #[test]
    fn test_query_and_query_file_conflict() {
        let result = Cli::try_parse_from(["dbsheet", "--query", "SELECT 1", "--query-file", "q.sql"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_headless_requires_query() {
        let cli = parse_args(&["dbsheet", "--headless", "-o", "out.xlsx"]);
        let err = cli.validate_headless().unwrap_err();
        assert!(err.contains("requires --query"));
    }

    #[test]
    fn test_validate_headless_requires_output() {
        let cli = parse_args(&["dbsheet", "--headless", "--query", "SELECT 1"]);
        let err = cli.validate_headless().unwrap_err();
        assert!(err.contains("requires --output"));
    }

    #[test]
    fn test_validate_headless_ok() {
        let cli = parse_args(&[
            "dbsheet",
            "--headless",
            "--mock-db",
            "--query",
            "SELECT 1",
            "-o",
            "out.xlsx",
            "--json",
        ]);
        assert!(cli.validate_headless().is_ok());
    }

    #[test]
    fn test_validate_output_without_headless() {
        let cli = parse_args(&["dbsheet", "-o", "out.xlsx"]);
        assert!(cli.validate_headless().is_err());
    }

    #[test]
    fn test_resolve_connection_cli_overrides_config() {
        let config: Config = toml::from_str(
            r#"
[connections.default]
url = "postgres://localhost/app"
username = "reporter"
password = "pw"
"#,
        )
        .unwrap();
        let cli = parse_args(&["dbsheet", "-U", "admin"]);

        let params = cli.resolve_connection(&config).unwrap();

        assert_eq!(params.url, "postgres://localhost/app");
        assert_eq!(params.username, "admin");
        assert_eq!(params.password, "pw");
    }

    #[test]
    fn test_resolve_connection_unknown_name() {
        let cli = parse_args(&["dbsheet", "-c", "missing"]);
        let err = cli.resolve_connection(&Config::default()).unwrap_err();
        assert!(matches!(err, SheetError::Config(_)));
    }

    #[test]
    fn test_read_query_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("q.sql");
        std::fs::write(&path, "SELECT * FROM people").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let cli = parse_args(&["dbsheet", "--query-file", &path_str]);
        assert_eq!(
            cli.read_query().unwrap(),
            Some("SELECT * FROM people".to_string())
        );

        let cli = parse_args(&["dbsheet", "--query-file", "/nonexistent/q.sql"]);
        assert!(matches!(cli.read_query(), Err(SheetError::Config(_))));
    }
}
