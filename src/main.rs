use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;

use trade_relay::api::AveClient;
use trade_relay::bot::RelayBot;
use trade_relay::cli::Cli;
use trade_relay::config::Config;
use trade_relay::logging;
use trade_relay::telegram::TelegramRelay;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.log_file.as_deref())?;

    info!("Starting trade relay...");

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| "config/config.toml".into());
    let mut config = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {:?}: {}", config_path, e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    config.apply_env_overrides()?;
    config.validate()?;
    info!("Configuration loaded successfully.");

    let market = Arc::new(AveClient::new(&config.market_data)?);
    let relay = Arc::new(RelayBot::new(&config, market)?);
    info!(
        "Relay initialized (window: {} x {}m, charts in {:?}).",
        config.market_data.size,
        config.market_data.interval_minutes,
        config.chart_dir()
    );

    let telegram = Arc::new(TelegramRelay::new(&config.telegram, relay));
    telegram.start().await?;

    info!("Trade relay stopped.");
    Ok(())
}
