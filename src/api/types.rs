use crate::error::{Error, Result};
use crate::models::market::{EnrichmentInfo, OhlcvPoint};
use serde::{Deserialize, Deserializer};

/// Status value the kline endpoint uses for success.
pub const KLINE_STATUS_OK: i64 = 1;

/// The API sends most numbers as strings; accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn de_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(NumberOrString::String(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(0.0),
    }
}

fn de_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    de_f64(deserializer).map(|v| if v.is_finite() && v > 0.0 { v as u64 } else { 0 })
}

#[derive(Debug, Deserialize)]
pub struct KlineResponse {
    pub status: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
pub struct KlineData {
    #[serde(default)]
    pub points: Vec<KlinePoint>,
}

#[derive(Debug, Deserialize)]
pub struct KlinePoint {
    pub time: i64,
    #[serde(deserialize_with = "de_f64")]
    pub open: f64,
    #[serde(deserialize_with = "de_f64")]
    pub high: f64,
    #[serde(deserialize_with = "de_f64")]
    pub low: f64,
    #[serde(deserialize_with = "de_f64")]
    pub close: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub volume: f64,
}

impl From<KlinePoint> for OhlcvPoint {
    fn from(p: KlinePoint) -> Self {
        OhlcvPoint {
            timestamp: p.time,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
        }
    }
}

impl KlineResponse {
    /// Points in ascending time order, or `NoChartData` when the API
    /// reported failure or returned nothing.
    pub fn into_points(self) -> Result<Vec<OhlcvPoint>> {
        if self.status != KLINE_STATUS_OK {
            return Err(Error::NoChartData(format!(
                "kline status {}: {}",
                self.status,
                self.msg.unwrap_or_default()
            )));
        }
        let mut points: Vec<OhlcvPoint> = self
            .data
            .map(|d| d.points)
            .unwrap_or_default()
            .into_iter()
            .map(OhlcvPoint::from)
            .collect();
        if points.is_empty() {
            return Err(Error::NoChartData("empty kline window".into()));
        }
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub data: TokenData,
}

#[derive(Debug, Deserialize)]
pub struct TokenData {
    pub token: TokenDetails,
}

#[derive(Debug, Deserialize)]
pub struct TokenDetails {
    #[serde(default, deserialize_with = "de_f64")]
    pub current_price_usd: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub tx_volume_u_24h: f64,
    #[serde(default, deserialize_with = "de_u64")]
    pub holders: u64,
    #[serde(default)]
    pub is_audited: bool,
    /// JSON document embedded as a string.
    #[serde(default)]
    pub appendix: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Appendix {
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TokenDetails {
    pub fn into_enrichment(self) -> Result<EnrichmentInfo> {
        let appendix: Appendix = match self.appendix.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)?,
            _ => Appendix::default(),
        };

        Ok(EnrichmentInfo {
            price_usd: self.current_price_usd,
            market_cap_usd: self.market_cap,
            volume_24h_usd: self.tx_volume_u_24h,
            holder_count: self.holders,
            is_audited: self.is_audited,
            website: non_empty(appendix.website),
            twitter_url: non_empty(appendix.twitter),
            telegram_url: non_empty(appendix.telegram),
            display_name: non_empty(self.name),
        })
    }
}
