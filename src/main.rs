//! db-sheet: run a SQL query, review the rows in an editable grid, save them to Excel.

use db_sheet::cli::Cli;
use db_sheet::config::{Config, ConnectionParams};
use db_sheet::db::{DataSource, MockDataSource, SqlDataSource};
use db_sheet::error::{Result, SheetError};
use db_sheet::export::{ExportTarget, HeaderSource};
use db_sheet::session::Session;
use db_sheet::{headless, logging, tui};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    if cli.is_headless() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e.message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    cli.validate_headless().map_err(SheetError::config)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let params = cli.resolve_connection(&config)?;
    let query = cli.read_query()?;

    let source: Box<dyn DataSource> = if cli.mock_db {
        info!("Using mock data source");
        Box::new(MockDataSource::new())
    } else {
        Box::new(SqlDataSource::new())
    };
    let mut session = Session::new(source, cli.header_policy_or(&config));

    if cli.is_headless() {
        run_headless(&cli, &config, &mut session, &params, query).await
    } else {
        let mut export = config.export.clone();
        if let Some(sheet) = &cli.sheet {
            export.sheet_name = sheet.clone();
        }
        tui::run(&mut session, &params, query, export).await
    }
}

async fn run_headless(
    cli: &Cli,
    config: &Config,
    session: &mut Session,
    params: &ConnectionParams,
    query: Option<String>,
) -> Result<()> {
    let sql = query.ok_or_else(|| SheetError::config("--headless requires a query"))?;
    let output = cli
        .output
        .as_deref()
        .ok_or_else(|| SheetError::config("--headless requires --output"))?;

    let sheet = cli
        .sheet
        .clone()
        .unwrap_or_else(|| config.export.sheet_name.clone());
    let target = ExportTarget::from_path(output, sheet);
    let headers = match &cli.headers {
        Some(labels) => HeaderSource::Custom(labels.clone()),
        None => HeaderSource::Grid,
    };

    let summary = headless::run(session, params, &sql, headers, &target).await?;
    println!("{}", headless::format_summary(&summary, cli.json)?);
    Ok(())
}
