use crate::api::types::{KlineResponse, TokenResponse};
use crate::api::{KlineWindow, MarketDataSource};
use crate::config::MarketDataConfig;
use crate::error::{Error, Result};
use crate::models::market::{EnrichmentInfo, OhlcvPoint};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Client for the AVE token data API.
#[derive(Debug, Clone)]
pub struct AveClient {
    client: Client,
    api_key: String,
    base_url: String,
    chain: String,
    interval_minutes: u32,
    size: u32,
}

impl AveClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain: config.chain.clone(),
            interval_minutes: config.interval_minutes,
            size: config.size,
        })
    }

    fn token_id(&self, contract: &str) -> String {
        format!("{}-{}", contract, self.chain)
    }

    pub async fn fetch_klines(&self, contract: &str, window: KlineWindow) -> Result<Vec<OhlcvPoint>> {
        let url = format!("{}/klines/token/{}", self.base_url, self.token_id(contract));
        let params = [
            ("interval", self.interval_minutes.to_string()),
            ("size", self.size.to_string()),
            ("to_time", window.to_time.to_string()),
            ("from_time", window.from_time.to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::NoChartData(format!(
                "kline request failed with status: {}",
                response.status()
            )));
        }

        let body: KlineResponse = response.json().await?;
        let points = body.into_points()?;
        debug!("Fetched {} kline points for {}", points.len(), contract);
        Ok(points)
    }
}

#[async_trait]
impl MarketDataSource for AveClient {
    async fn fetch_ohlcv(&self, contract: &str) -> Result<Vec<OhlcvPoint>> {
        let window = KlineWindow::ending_at(Utc::now().timestamp(), self.interval_minutes, self.size);
        self.fetch_klines(contract, window).await
    }

    async fn fetch_token_info(&self, contract: &str) -> Result<EnrichmentInfo> {
        let url = format!("{}/tokens/{}", self.base_url, self.token_id(contract));

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Token info request for {} failed with status: {}", contract, status);
            return Err(Error::ApiError(format!("token request failed with status: {}", status)));
        }

        let body: TokenResponse = response.json().await?;
        body.data.token.into_enrichment()
    }
}
