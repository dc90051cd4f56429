//! Binary crate for the `weather-server` HTTP service.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use weather_core::{Config, WeatherService};
use weather_server::{AppState, messenger_from_config, router};

#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather HTTP API and chat webhook")]
struct Args {
    /// Config file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env_overrides(|key| std::env::var(key).ok());
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let service = WeatherService::from_config(&config)?;
    let app = router(AppState::new(service, messenger_from_config(&config)));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(
        addr = %config.server.bind,
        summarizer = %config.summarizer_kind()?,
        "weather server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    info!("weather server stopped");
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
