use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use optistock_import::{CsvImportProfile, HttpSource};
use optistock_server::{
    build_router, import_csv_file, open_database, spawn_refresh_loop, AppState, LogFormat, Orchestrator,
    ViewerConfig,
};
use optistock_storage::LocalCache;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Stock viewer for the optical shop's inventory sheet.
#[derive(Debug, Parser)]
#[command(name = "optistock", version, about)]
struct Cli {
    /// TOML settings file (default: ./optistock.toml if present)
    #[arg(long, env = "OPTISTOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Sheet endpoint; overrides `api_url` from the settings file
    #[arg(long, env = "OPTISTOCK_API_URL")]
    api_url: Option<String>,

    /// Load a CSV export of the sheet before serving
    #[arg(long, value_name = "FILE")]
    import_csv: Option<PathBuf>,

    #[arg(long, default_value = ",")]
    csv_delimiter: String,

    /// Listen address; overrides `bind_addr`
    #[arg(long)]
    bind: Option<String>,
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new("optistock".into(), std::io::stdout))
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ViewerConfig::load(cli.config.as_deref())?.with_api_url(cli.api_url);
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    init_tracing(config.log_format)?;

    let db_path = config.resolve_database_path();
    let pool = open_database(db_path.as_deref())
        .await
        .context("Failed to open cache database")?;
    let cache = LocalCache::new(pool, config.cache_key.clone(), config.cache_ttl());

    let source = HttpSource::new(config.api_url.clone(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    let orch = Orchestrator::new(source, cache, AppState::shared(), config.loading_failsafe());

    if let Some(path) = &cli.import_csv {
        let profile = CsvImportProfile {
            delimiter: cli.csv_delimiter.clone(),
        };
        let count = import_csv_file(&orch, path, &profile)
            .await
            .with_context(|| format!("Failed to import {}", path.display()))?;
        tracing::info!("imported {count} records from {}", path.display());
    }

    // ── Start-up: cached copy first, then a live fetch ────────────────────────
    if config.api_url.trim().is_empty() {
        tracing::warn!("no api_url configured; serving cached or imported stock only");
        orch.load_cached().await;
    } else {
        tokio::spawn({
            let orch = Arc::clone(&orch);
            async move {
                let outcome = orch.startup().await;
                tracing::debug!(?outcome, "start-up fetch done");
            }
        });
        spawn_refresh_loop(Arc::clone(&orch), config.refresh_interval());
    }

    // ── HTTP ──────────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(orch)).await?;
    Ok(())
}
