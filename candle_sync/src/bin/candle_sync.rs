use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use candle_sync::{
    api,
    cache::SnapshotCache,
    config::SyncConfig,
    refresh::{CandleRefresher, SymbolRefresher},
    scheduler::Scheduler,
};
use clap::Parser;
use market_data_ingestor::providers::{DataProvider, hyperliquid::HyperliquidProvider};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Serves periodically refreshed candles for every listed perpetual")]
struct Cli {
    /// Optional TOML file; environment variables override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let provider: Arc<dyn DataProvider> = Arc::new(
        HyperliquidProvider::new(config.upstream_url.clone(), config.api_key.clone())
            .context("failed to build upstream client")?,
    );
    let cache = Arc::new(SnapshotCache::new());

    info!(
        timeframe = %config.timeframe,
        lookback_days = config.lookback_days,
        candle_every_min = config.refresh_interval_min,
        symbol_every_min = config.symbol_refresh_interval_min,
        upstream = %config.upstream_url,
        "starting candle sync"
    );

    let scheduler = Scheduler::start(
        SymbolRefresher::new(Arc::clone(&provider), Arc::clone(&cache)),
        CandleRefresher::new(provider, Arc::clone(&cache), config.candle_settings()),
        config.symbol_period(),
        config.candle_period(),
    )
    .await;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, api::router(cache))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
