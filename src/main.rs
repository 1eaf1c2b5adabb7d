use anyhow::{Context, Result};
use bookshelf_server::{
    config::{AppConfig, CliConfig, FileConfig},
    run_server, OpenLibraryClient, RequestsLoggingLevel, SqliteBookStore,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file holding the collection.
    #[clap(long, value_parser = parse_path, default_value = "bookshelf.db")]
    pub db_file: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub web_dir: Option<String>,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Open Library search API.
    #[clap(long, default_value = "https://openlibrary.org")]
    pub search_base_url: String,

    /// Base URL of the Open Library covers service.
    #[clap(long, default_value = "https://covers.openlibrary.org")]
    pub covers_base_url: String,

    /// Timeout in seconds for external search requests.
    #[clap(long, default_value_t = 10)]
    pub search_timeout_sec: u64,

    /// Maximum number of results requested from the external catalog.
    #[clap(long, default_value_t = 10)]
    pub search_limit: usize,

    /// Maximum accepted request body size in bytes.
    #[clap(long, default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Optional TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_file: args.db_file.clone(),
            port: args.port,
            web_dir: args.web_dir.clone(),
            logging_level: args.logging_level.clone(),
            search_base_url: args.search_base_url.clone(),
            covers_base_url: args.covers_base_url.clone(),
            search_timeout_sec: args.search_timeout_sec,
            search_limit: args.search_limit,
            max_body_bytes: args.max_body_bytes,
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
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    if let Some(parent) = config.db_file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }
    }

    info!("Opening SQLite book database at {:?}...", config.db_file);
    let book_store = Arc::new(SqliteBookStore::new(&config.db_file)?);

    info!(
        "Searching the external catalog at {}",
        config.search_base_url
    );
    let catalog_search = Arc::new(OpenLibraryClient::new(config.open_library_config())?);

    info!("Ready to serve at port {}!", config.port);
    run_server(config.server_config(), book_store, catalog_search).await
}
