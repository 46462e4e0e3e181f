use crate::config::{ActionLink, ChartConfig, Config, LinksConfig, MarketDataConfig, TelegramConfig};
use crate::models::market::{EnrichmentInfo, OhlcvPoint};
use crate::models::{Direction, TradeRecord};

pub const TEST_CONTRACT: &str = "AbCdEfGh12345678901234567890";

/// 2023-11-14 22:13:00 UTC
pub const SERIES_START: i64 = 1_699_999_980;

pub const TEST_CONFIG_TOML: &str = r#"
[telegram]
bot_token = "test-token"
source_chat_id = -1001
target_chat_id = -1002

[market_data]
api_key = "test-key"

[links]
search_url = "https://search.example.com/sou="
relay_url = "https://relay.example.com"

[[links.actions]]
label = "🔗 Trade"
url = "https://t.me/SomeTradeBot?start={contract}"

[[links.actions]]
label = "🆗 OKX"
url = "https://okx.example.com/{contract}"
"#;

// Helper to create a default test config
pub fn create_test_config() -> Config {
    Config {
        telegram: TelegramConfig {
            bot_token: "test-token".to_string(),
            source_chat_id: -1001,
            target_chat_id: -1002,
        },
        market_data: MarketDataConfig {
            api_key: "test-key".to_string(),
            base_url: "http://localhost:0".to_string(),
            chain: "solana".to_string(),
            interval_minutes: 1,
            size: 100,
            timeout_secs: 2,
        },
        chart: ChartConfig::default(),
        links: LinksConfig {
            search_url: "https://search.example.com/sou=".to_string(),
            relay_url: "https://relay.example.com".to_string(),
            price_chart_url: "https://dexscreener.com/solana/".to_string(),
            actions: vec![
                ActionLink {
                    label: "🔗 Trade".to_string(),
                    url: "https://t.me/SomeTradeBot?start={contract}".to_string(),
                },
                ActionLink {
                    label: "🆗 OKX".to_string(),
                    url: "https://okx.example.com/{contract}".to_string(),
                },
            ],
        },
    }
}

pub fn sample_record() -> TradeRecord {
    TradeRecord {
        direction: Direction::Buy,
        trader_label: Some("Alice".to_string()),
        token: Some("FOO".to_string()),
        pay_amount: Some("0.5".to_string()),
        pay_token: Some("SOL".to_string()),
        usd_value: Some("350.00".to_string()),
        contract_address: TEST_CONTRACT.to_string(),
    }
}

pub fn sample_enrichment() -> EnrichmentInfo {
    EnrichmentInfo {
        price_usd: 0.00001234,
        market_cap_usd: 1_234_567.0,
        volume_24h_usd: 89_000.5,
        holder_count: 4321,
        is_audited: true,
        website: Some("https://foo.io".to_string()),
        twitter_url: Some("https://x.com/foo".to_string()),
        telegram_url: None,
        display_name: Some("Foo Coin".to_string()),
    }
}

/// `n` one-minute candles drifting around 0.00002, alternating up and down.
pub fn sample_series(n: usize) -> Vec<OhlcvPoint> {
    (0..n)
        .map(|i| {
            let base = 0.00002 + (i % 7) as f64 * 0.000001;
            let (open, close) = if i % 2 == 0 {
                (base, base * 1.03)
            } else {
                (base * 1.03, base)
            };
            OhlcvPoint {
                timestamp: SERIES_START + 60 * i as i64,
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1000.0 + i as f64,
            }
        })
        .collect()
}
