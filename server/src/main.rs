//! Server entrypoint for ensemble
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use ensemble_infrastructure::config::ConfigLoader;
use ensemble_infrastructure::gateway::HttpCompletionGateway;
use ensemble_infrastructure::store::{SqliteTranscriptStore, SqliteXpStore, init_schema};
use ensemble_presentation::AppContext;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Multi-model orchestration and interview coaching server
#[derive(Parser, Debug)]
#[command(name = "ensembled", version, about)]
struct Cli {
    /// Path to a config file (overrides discovered configs)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip config file discovery and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Override the listen address, e.g. 0.0.0.0:9000
    #[arg(short, long)]
    bind: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting ensemble server");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    config.validate().context("invalid configuration")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    init_schema(&pool).await.context("failed to initialize schema")?;

    // === Dependency Injection ===
    let client = reqwest::Client::new();
    let gateway = Arc::new(HttpCompletionGateway::from_config(
        client,
        &config.providers.resolve(),
    ));
    let transcripts = Arc::new(SqliteTranscriptStore::new(pool.clone()));
    let xp = Arc::new(SqliteXpStore::new(pool));

    let ctx = AppContext::new(
        gateway,
        transcripts,
        xp,
        config.models.default_models(),
        config.models.synthesizer.clone(),
        config.models.coach.clone(),
    );

    let bind_addr = cli.bind.unwrap_or_else(|| config.server.listen_addr());
    ensemble_presentation::run(&bind_addr, ctx)
        .await
        .context("server error")?;

    Ok(())
}
