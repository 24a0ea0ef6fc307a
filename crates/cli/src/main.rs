//! # tap-wordpress-plugin-stats
//!
//! Singer tap entry point. In discovery mode it prints the catalog; otherwise it
//! syncs the selected streams and writes Singer messages to stdout. Logs go to
//! stderr so stdout stays a clean message stream.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};
use wpstats::{
    sync, Catalog, HandlerRegistry, JsonLinesWriter, StreamRegistry, TapConfig, WordPressClient,
};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Singer tap for WordPress.org plugin statistics", long_about = None)]
struct Cli {
    /// Path to the tap configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,
    /// Print the catalog of available streams and exit
    #[arg(short, long)]
    discover: bool,
    /// Path to a catalog file selecting the streams to sync
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Path to a state file. Accepted for compatibility; this tap keeps no state.
    #[arg(short, long)]
    state: Option<PathBuf>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    run(cli).await.inspect_err(|e| error!("{e:#}"))
}

async fn run(cli: Cli) -> Result<()> {
    info!(
        ">>> Running tap-wordpress-plugin-stats v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = TapConfig::from_path(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let registry = StreamRegistry::new();

    if cli.discover {
        let catalog = Catalog::discover(&registry);
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    if let Some(state) = &cli.state {
        debug!("Ignoring state file {}: this tap is stateless", state.display());
    }

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::discover(&registry),
    };

    let handlers = HandlerRegistry::new(&registry);
    let client = WordPressClient::new(&config)?;
    let mut writer = JsonLinesWriter::stdout();

    let summary = sync(&client, &handlers, &catalog, &mut writer).await?;
    info!(
        "Sync finished: {} records across {} streams",
        summary.total(),
        summary.streams.len()
    );
    Ok(())
}
