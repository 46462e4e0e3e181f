use crate::error::Result;
use crate::models::market::{EnrichmentInfo, OhlcvPoint};
use async_trait::async_trait;

pub mod ave;
pub mod types;

pub use ave::AveClient;

/// Time window for a kline request, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KlineWindow {
    pub from_time: i64,
    pub to_time: i64,
}

impl KlineWindow {
    /// Window of `size` buckets ending one second before the minute
    /// boundary at or before `now`.
    pub fn ending_at(now: i64, interval_minutes: u32, size: u32) -> Self {
        let to_time = now - now.rem_euclid(60) - 1;
        let from_time = to_time - i64::from(size) * i64::from(interval_minutes) * 60;
        Self { from_time, to_time }
    }
}

/// Read-only market data the relay needs for one contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Recent OHLCV window. Fails with `NoChartData` when there is nothing
    /// to draw.
    async fn fetch_ohlcv(&self, contract: &str) -> Result<Vec<OhlcvPoint>>;

    async fn fetch_token_info(&self, contract: &str) -> Result<EnrichmentInfo>;
}
