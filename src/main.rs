//! hive-indexer - Collects per-file block offsets of a Hive column.

use hive_indexer::app::{self, RunOptions};
use hive_indexer::cli::Cli;
use hive_indexer::config::{Config, ConnectionConfig};
use hive_indexer::connection::ConnectionManager;
use hive_indexer::db::{MockConnector, MockHiveClient};
use hive_indexer::error::{HiveError, Result};
use hive_indexer::logging;
use tracing::{error, info};

fn main() {
    // HIVE_URL, HIVE_HOST and HIVE_PORT may come from a .env file.
    dotenvy::dotenv().ok();

    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    match &cli.log_file {
        Some(path) => {
            if let Err(e) = logging::init_file_logging(path) {
                eprintln!("{}: {}", e.category(), e);
                std::process::exit(e.exit_code());
            }
        }
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(&cli) {
        error!("{}: {}", e.category(), e);
        if cli.log_file.is_some() {
            eprintln!("{}: {}", e.category(), e);
        }
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(cli, &config)?;

    let mut manager = match &cli.mock {
        Some(path) => {
            info!("Serving rows from {}", path.display());
            let client = MockHiveClient::from_json_file(path)?;
            ConnectionManager::with_connector(connection, MockConnector::new(client))
        }
        None => ConnectionManager::new(connection),
    };

    let options = RunOptions {
        limit: cli.limit,
        format: cli.parse_output_format()?,
        validate: cli.validate || config.query.validate,
        ..RunOptions::new(cli.table.clone(), cli.column.clone())
    };

    let stdout = std::io::stdout();
    app::run(&mut manager, &options, &mut stdout.lock())?;
    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// Precedence: CLI arguments, then the named connection, then the default
/// connection from the config file, then HIVE_HOST/HIVE_PORT, then
/// localhost:10000.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            HiveError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(cli_connection) = cli.to_connection_config()? {
        connection.merge(&cli_connection);
    }
    connection.merge(&cli.timeout_overrides());
    connection.apply_env_defaults();

    info!("Connection: {}", connection.display_string());
    Ok(connection)
}
