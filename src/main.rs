use anyhow::{Context, Result, bail};
use relay_chat::{config, server};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Installs the JSON subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(configured: &str) -> Result<String> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| configured.to_string());
    if level.parse::<LevelFilter>().is_err() {
        bail!("Invalid log level '{level}', expected one of: error, warn, info, debug, trace");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
    Ok(level)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()
        .await
        .context("Failed to load configuration")?;
    let level = init_tracing(&config.server.logs.level)?;

    info!("relay-chat {} (log level {})", env!("CARGO_PKG_VERSION"), level);
    server::run(config).await?;
    Ok(())
}
