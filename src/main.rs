//! abakus server: loads a tariff and serves cost projections over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use abakus::api::{AppState, create_router};
use abakus::config::TariffLoader;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "abakus")]
#[command(about = "Personnel cost projection server", long_about = None)]
#[command(version)]
struct Cli {
    /// Tariff data: a YAML tariff directory or a text tariff file
    #[arg(long, env = "ABAKUS_TARIFF")]
    tariff: PathBuf,

    /// Address to listen on
    #[arg(long, env = "ABAKUS_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "ABAKUS_LOG", default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {}", err))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let table = TariffLoader::load(&cli.tariff)
        .with_context(|| format!("failed to load tariff from {}", cli.tariff.display()))?;
    info!(
        tariff = %cli.tariff.display(),
        records = table.len(),
        years = ?table.years(),
        "Tariff loaded"
    );

    let router = create_router(AppState::new(table));
    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!(bind = %cli.bind, "Listening");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
