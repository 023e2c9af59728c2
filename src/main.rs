use anyhow::{Context, Result};
use fetch_rates::api_server;
use fetch_rates::config::AppConfig;
use fetch_rates::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    // Fail fast on missing configuration, before any network call.
    let cfg = AppConfig::from_env().context("Invalid configuration")?;

    api_server::start_server(cfg).await
}
