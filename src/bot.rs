use crate::api::MarketDataSource;
use crate::chart::CandlestickRenderer;
use crate::composer::{
    escape_markdown, Enrichment, NotificationComposer, OutboundPayload, ENRICHMENT_FAILED,
    ENRICHMENT_REQUEST_ERROR,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::TradeMessageParser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Message-to-notification pipeline: parse, fetch chart data and token
/// details side by side, render, compose.
pub struct RelayBot {
    parser: TradeMessageParser,
    market: Arc<dyn MarketDataSource>,
    renderer: CandlestickRenderer,
    composer: NotificationComposer,
    chart_dir: PathBuf,
    fetch_timeout: Duration,
    chart_seq: AtomicU64,
}

impl RelayBot {
    pub fn new(config: &Config, market: Arc<dyn MarketDataSource>) -> Result<Self> {
        Ok(Self {
            parser: TradeMessageParser::new()?,
            market,
            renderer: CandlestickRenderer::new(&config.chart)?,
            composer: NotificationComposer::new(&config.links),
            chart_dir: config.chart_dir(),
            fetch_timeout: Duration::from_secs(config.market_data.timeout_secs),
            chart_seq: AtomicU64::new(0),
        })
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Runs one message through the pipeline. `None` means the message is
    /// not a trade notification and nothing should be sent.
    pub async fn process(&self, text: &str) -> Option<OutboundPayload> {
        let record = self.parser.parse(text)?;
        info!(
            "Parsed {} of {} by {} ({})",
            record.direction.label(),
            record.token.as_deref().unwrap_or("?"),
            record.trader_label.as_deref().unwrap_or("?"),
            record.contract_address
        );

        let contract = record.contract_address.as_str();
        let (enrichment, chart) = tokio::join!(self.enrichment(contract), self.chart(contract));

        Some(self.composer.compose(&record, &enrichment, chart))
    }

    async fn enrichment(&self, contract: &str) -> Enrichment {
        match timeout(self.fetch_timeout, self.market.fetch_token_info(contract)).await {
            Ok(Ok(info)) => Enrichment::Ready(info),
            Ok(Err(Error::ApiError(msg))) => {
                warn!("Token details for {} unavailable: {}", contract, msg);
                Enrichment::Failed(ENRICHMENT_FAILED.to_string())
            }
            Ok(Err(e)) => {
                warn!("Token details request for {} failed: {}", contract, e);
                // the body goes out as Markdown
                let reason = escape_markdown(&e.to_string());
                Enrichment::Failed(format!("{}: {}", ENRICHMENT_REQUEST_ERROR, reason))
            }
            Err(_) => {
                warn!("Token details request for {} timed out", contract);
                Enrichment::Failed(format!("{}: timed out", ENRICHMENT_REQUEST_ERROR))
            }
        }
    }

    async fn chart(&self, contract: &str) -> Option<PathBuf> {
        match self.try_chart(contract).await {
            Ok(chart) => chart,
            Err(Error::NoChartData(reason)) => {
                debug!("No chart for {}: {}", contract, reason);
                None
            }
            Err(e) => {
                warn!("Chart for {} failed: {}", contract, e);
                None
            }
        }
    }

    async fn try_chart(&self, contract: &str) -> Result<Option<PathBuf>> {
        let series = timeout(self.fetch_timeout, self.market.fetch_ohlcv(contract))
            .await
            .map_err(|_| Error::Timeout(format!("kline fetch for {}", contract)))??;

        let renderer = self.renderer.clone();
        let path = self.chart_path(contract);
        tokio::task::spawn_blocking(move || renderer.render(&series, &path)).await?
    }

    fn chart_path(&self, contract: &str) -> PathBuf {
        let seq = self.chart_seq.fetch_add(1, Ordering::Relaxed);
        self.chart_dir
            .join(format!("kline_{}_{}_{}.png", contract, std::process::id(), seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;
    use crate::models::market::{EnrichmentInfo, OhlcvPoint};
    use crate::tests::common::{create_test_config, sample_enrichment, sample_series, TEST_CONTRACT};
    use async_trait::async_trait;

    fn message() -> String {
        format!("🟢 Alice bought 1.2k FOO with 0.5 SOL ($350.00) 📋 {}", TEST_CONTRACT)
    }

    fn relay(market: impl MarketDataSource + 'static) -> RelayBot {
        RelayBot::new(&create_test_config(), Arc::new(market)).unwrap()
    }

    #[tokio::test]
    async fn test_non_trade_message_is_dropped() {
        // no expectations: any fetch would panic
        let bot = relay(MockMarketDataSource::new());
        assert!(bot.process("gm everyone").await.is_none());
        assert!(bot.process("🟢 Alice bought 1 FOO, no contract").await.is_none());
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_photo() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_fetch_ohlcv()
            .withf(|c: &str| c == TEST_CONTRACT)
            .returning(|_| Ok(sample_series(100)));
        market
            .expect_fetch_token_info()
            .returning(|_| Ok(sample_enrichment()));

        let payload = relay(market).process(&message()).await.unwrap();
        let image = payload.image().cloned().expect("chart expected");
        assert!(image.exists());
        assert!(payload.text().contains("Market cap: $1.23M"));
        std::fs::remove_file(image).ok();
    }

    #[tokio::test]
    async fn test_missing_chart_data_degrades_to_text() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_fetch_ohlcv()
            .returning(|_| Err(Error::NoChartData("empty kline window".into())));
        market
            .expect_fetch_token_info()
            .returning(|_| Ok(sample_enrichment()));

        let payload = relay(market).process(&message()).await.unwrap();
        assert!(matches!(payload, OutboundPayload::Text { .. }));
        assert!(payload.text().contains("👥 Holders: 4321"));
    }

    #[tokio::test]
    async fn test_enrichment_status_failure_uses_placeholder() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_fetch_ohlcv()
            .returning(|_| Err(Error::NoChartData("status 0".into())));
        market
            .expect_fetch_token_info()
            .returning(|_| Err(Error::ApiError("token request failed with status: 404".into())));

        let payload = relay(market).process(&message()).await.unwrap();
        assert!(payload.text().contains(ENRICHMENT_FAILED));
        assert!(payload.text().contains("📋 Contract: AbCdEfGh12345678901234567890"));
    }

    #[tokio::test]
    async fn test_enrichment_request_error_is_reported_inline() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_fetch_ohlcv()
            .returning(|_| Err(Error::NoChartData("status 0".into())));
        market
            .expect_fetch_token_info()
            .returning(|_| Err(Error::ApiInvalidFormat("expected value".into())));

        let payload = relay(market).process(&message()).await.unwrap();
        assert!(payload.text().contains("❌ Request error: API invalid format: expected value"));
    }

    #[tokio::test]
    async fn test_request_error_text_is_markdown_escaped() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_fetch_ohlcv()
            .returning(|_| Err(Error::NoChartData("status 0".into())));
        market
            .expect_fetch_token_info()
            .returning(|_| Err(Error::ApiInvalidFormat("missing field `token_id`".into())));

        let payload = relay(market).process(&message()).await.unwrap();
        assert!(payload
            .text()
            .contains("❌ Request error: API invalid format: missing field \\`token\\_id\\`"));
    }

    struct SlowMarket;

    #[async_trait]
    impl MarketDataSource for SlowMarket {
        async fn fetch_ohlcv(&self, _contract: &str) -> Result<Vec<OhlcvPoint>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(sample_series(5))
        }

        async fn fetch_token_info(&self, _contract: &str) -> Result<EnrichmentInfo> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(sample_enrichment())
        }
    }

    #[tokio::test]
    async fn test_slow_branches_time_out_independently() {
        let bot = relay(SlowMarket).with_fetch_timeout(Duration::from_millis(50));
        let payload = bot.process(&message()).await.unwrap();
        assert!(payload.image().is_none());
        assert!(payload.text().contains("❌ Request error: timed out"));
    }

    #[test]
    fn test_chart_paths_are_unique_per_run() {
        let bot = relay(MockMarketDataSource::new());
        assert_ne!(bot.chart_path(TEST_CONTRACT), bot.chart_path(TEST_CONTRACT));
    }
}
