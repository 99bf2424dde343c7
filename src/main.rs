use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use film_agent_server::config::{AppConfig, CliConfig, FileConfig};
use film_agent_server::content::{ContentAggregator, RecordNormalizer, DEFAULT_IMAGE_BASE_URL};
use film_agent_server::history::SqliteSearchHistoryStore;
use film_agent_server::server::{self, run_server, RequestsLoggingLevel};
use film_agent_server::tmdb::{TmdbClient, DEFAULT_TMDB_BASE_URL};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the search history database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// TMDB v3 API key.
    #[clap(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    /// Base URL of the TMDB API.
    #[clap(long, env = "TMDB_BASE_URL", default_value = DEFAULT_TMDB_BASE_URL)]
    pub tmdb_base_url: String,

    /// Base URL prepended to poster paths.
    #[clap(long, env = "TMDB_IMAGE_BASE_URL", default_value = DEFAULT_IMAGE_BASE_URL)]
    pub tmdb_image_base_url: String,

    /// Timeout in seconds for each TMDB request.
    #[clap(long, default_value_t = 10)]
    pub upstream_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            tmdb_api_key: self.tmdb_api_key.clone(),
            tmdb_base_url: self.tmdb_base_url.clone(),
            tmdb_image_base_url: self.tmdb_image_base_url.clone(),
            upstream_timeout_sec: self.upstream_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!(
        "Opening search history database at {:?}...",
        config.history_db_path()
    );
    let history = Arc::new(SqliteSearchHistoryStore::new(config.history_db_path())?);

    info!("Using TMDB at {}", config.tmdb.base_url);
    let provider = Arc::new(TmdbClient::new(config.tmdb_client_config())?);
    let aggregator = ContentAggregator::new(
        provider,
        history,
        RecordNormalizer::new(config.tmdb.image_base_url.clone()),
    );

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(config.server_config(), Arc::new(aggregator)).await
}
