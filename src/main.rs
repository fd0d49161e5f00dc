//! dbpulse: database status service.
//!
//! This is the application entry point. `serve` (the default) initializes
//! tracing, loads configuration, creates the lazy database pool, sets up the
//! Axum router and runs the HTTP server until a shutdown signal, then closes
//! the pool. `check` runs the terminal client against a running instance.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dbpulse::client::{self, StatusClient, CLIENT_TIMEOUT};
use dbpulse::config::{AppConfig, DEFAULT_CLIENT_URL, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use dbpulse::db::Database;
use dbpulse::http::start_server;
use dbpulse::probe::{PostgresProbe, StatusChecker};
use dbpulse::routes::create_router;
use dbpulse::state::AppState;
use dbpulse::templates::init_templates;

/// dbpulse: HTTP status service for a PostgreSQL dependency
#[derive(Parser, Debug)]
#[command(name = "dbpulse", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level filter (e.g., "dbpulse=debug,tower_http=info")
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Query /hello and /status of a running instance
    Check {
        /// Base URL of the service
        #[arg(long, default_value = DEFAULT_CLIENT_URL)]
        url: String,

        /// Repeat every N seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

fn init_tracing(filter: &str, json: bool) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // An explicit --config must exist; the default path is optional
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, config.logging.is_json());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { url, watch } => {
            let client = StatusClient::new(&url, CLIENT_TIMEOUT)?;
            if let Some(secs) = watch {
                client::watch(&client, Duration::from_secs(secs.max(1))).await;
                return Ok(ExitCode::SUCCESS);
            }
            if client::check_once(&client).await {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        user = %config.database.user,
        probe_timeout_secs = config.probe.timeout_seconds,
        "Loaded configuration"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    // Owned pool: created here, injected into the probe, closed after the server drains
    let database = Database::connect_lazy(&config.database);
    let checker = StatusChecker::new(
        Arc::new(PostgresProbe::new(&database)),
        config.probe.timeout(),
    );

    let state = AppState::new(config.clone(), tera, checker);
    let app = create_router(state);

    let result = start_server(app, &config).await;
    database.close().await;
    result?;

    Ok(())
}
