use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat the trade notifications are read from.
    pub source_chat_id: i64,
    /// Chat the composed notifications are posted to.
    pub target_chat_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarketDataConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Hex colour, e.g. "#008000".
    pub up_color: String,
    pub down_color: String,
    /// Offset applied to timestamps before formatting the x-axis labels.
    pub label_utc_offset_minutes: i32,
    /// Where chart images are written. Defaults to the system temp dir.
    pub output_dir: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            up_color: "#008000".to_string(),
            down_color: "#ff0000".to_string(),
            label_utc_offset_minutes: 0,
            output_dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LinksConfig {
    /// Prefix the token or project name is appended to.
    pub search_url: String,
    /// Host that twitter links and the share button are rewritten onto.
    pub relay_url: String,
    /// Prefix the contract is appended to for the price link.
    #[serde(default = "default_price_chart_url")]
    pub price_chart_url: String,
    /// Fixed buttons; `{contract}` in the url is replaced per message.
    #[serde(default)]
    pub actions: Vec<ActionLink>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActionLink {
    pub label: String,
    pub url: String,
}

fn default_base_url() -> String {
    "https://prod.ave-api.com/v2".to_string()
}

fn default_chain() -> String {
    "solana".to_string()
}

fn default_interval_minutes() -> u32 {
    1
}

fn default_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_price_chart_url() -> String {
    "https://dexscreener.com/solana/".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        Ok(config)
    }

    /// Fills credentials and chat ids from the environment (and `.env`).
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        dotenv::dotenv().ok();

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(key) = std::env::var("AVE_API_KEY") {
            self.market_data.api_key = key;
        }
        if let Ok(id) = std::env::var("SOURCE_CHAT_ID") {
            self.telegram.source_chat_id = id
                .parse()
                .map_err(|_| Error::ConfigError(format!("SOURCE_CHAT_ID is not a chat id: {}", id)))?;
        }
        if let Ok(id) = std::env::var("TARGET_CHAT_ID") {
            self.telegram.target_chat_id = id
                .parse()
                .map_err(|_| Error::ConfigError(format!("TARGET_CHAT_ID is not a chat id: {}", id)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::ConfigError("telegram.bot_token is empty".into()));
        }
        if self.market_data.api_key.trim().is_empty() {
            return Err(Error::ConfigError("market_data.api_key is empty".into()));
        }
        if self.telegram.source_chat_id == self.telegram.target_chat_id {
            return Err(Error::ConfigError(
                "source and target chat must differ".into(),
            ));
        }
        if self.market_data.size == 0 || self.market_data.interval_minutes == 0 {
            return Err(Error::ConfigError(
                "market_data.size and interval_minutes must be positive".into(),
            ));
        }
        for action in &self.links.actions {
            let probe = action.url.replace("{contract}", "probe");
            Url::parse(&probe).map_err(|e| {
                Error::ConfigError(format!("bad url for action '{}': {}", action.label, e))
            })?;
        }
        Ok(())
    }

    pub fn chart_dir(&self) -> PathBuf {
        self.chart
            .output_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
