use trade_relay::config::MarketDataConfig;

pub const CONTRACT: &str = "AbCdEfGh12345678901234567890";
pub const API_KEY: &str = "test-key";

// Helper to point the market data client at a mock server
pub fn market_config(base_url: &str) -> MarketDataConfig {
    MarketDataConfig {
        api_key: API_KEY.to_string(),
        base_url: base_url.to_string(),
        chain: "solana".to_string(),
        interval_minutes: 1,
        size: 100,
        timeout_secs: 5,
    }
}
