use serde::{Deserialize, Serialize};

/// One candle of the chart window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvPoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentInfo {
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_24h_usd: f64,
    pub holder_count: u64,
    pub is_audited: bool,
    pub website: Option<String>,
    pub twitter_url: Option<String>,
    pub telegram_url: Option<String>,
    pub display_name: Option<String>,
}
