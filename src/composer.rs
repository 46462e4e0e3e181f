use crate::config::{ActionLink, LinksConfig};
use crate::format::{format_compact_usd, format_price};
use crate::models::market::EnrichmentInfo;
use crate::models::TradeRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::form_urlencoded::byte_serialize;

/// Shown instead of token details when the API answered with an error status.
pub const ENRICHMENT_FAILED: &str = "❌ Failed to fetch token details";
/// Prefix for token details that failed before any answer arrived.
pub const ENRICHMENT_REQUEST_ERROR: &str = "❌ Request error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Ready(EnrichmentInfo),
    /// Text that stands in for the token details.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    Photo {
        image: PathBuf,
        caption: String,
        buttons: Vec<Vec<LinkButton>>,
    },
    Text {
        body: String,
        buttons: Vec<Vec<LinkButton>>,
    },
}

impl OutboundPayload {
    pub fn text(&self) -> &str {
        match self {
            OutboundPayload::Photo { caption, .. } => caption,
            OutboundPayload::Text { body, .. } => body,
        }
    }

    pub fn buttons(&self) -> &[Vec<LinkButton>] {
        match self {
            OutboundPayload::Photo { buttons, .. } | OutboundPayload::Text { buttons, .. } => buttons,
        }
    }

    pub fn image(&self) -> Option<&PathBuf> {
        match self {
            OutboundPayload::Photo { image, .. } => Some(image),
            OutboundPayload::Text { .. } => None,
        }
    }
}

/// Escapes the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// Builds the outbound notification from a parsed trade and whatever
/// enrichment survived.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    search_url: String,
    relay_url: String,
    price_chart_url: String,
    actions: Vec<ActionLink>,
}

impl NotificationComposer {
    pub fn new(links: &LinksConfig) -> Self {
        Self {
            search_url: links.search_url.clone(),
            relay_url: format!("{}/", links.relay_url.trim_end_matches('/')),
            price_chart_url: links.price_chart_url.clone(),
            actions: links.actions.clone(),
        }
    }

    pub fn compose(
        &self,
        record: &TradeRecord,
        enrichment: &Enrichment,
        chart: Option<PathBuf>,
    ) -> OutboundPayload {
        let mut text = self.summary(record);
        let mut buttons = self.action_buttons(&record.contract_address);

        match enrichment {
            Enrichment::Ready(info) => {
                text.push_str(&self.details(&record.contract_address, info));
                buttons.push(vec![self.share_button(&record.contract_address, info)]);
            }
            Enrichment::Failed(placeholder) => {
                text.push('\n');
                text.push_str(placeholder);
            }
        }

        match chart {
            Some(image) => OutboundPayload::Photo {
                image,
                caption: text,
                buttons,
            },
            None => OutboundPayload::Text { body: text, buttons },
        }
    }

    /// Three-line trade summary: who did what, what was paid, which contract.
    pub fn summary(&self, record: &TradeRecord) -> String {
        let emoji = record.direction.emoji();
        let name = escape_markdown(record.trader_label.as_deref().unwrap_or_default());
        let token = record.token.as_deref().unwrap_or_default();

        format!(
            "{emoji} {name} {emoji} {action} [{token_text}]({search}{token_query})\n\
             💵 Paid: {amount} {pay_token}($ {usd})\n\
             📋 Contract: {contract}",
            emoji = emoji,
            name = name,
            action = record.direction.label(),
            token_text = escape_markdown(token),
            search = self.search_url,
            token_query = encode(token),
            amount = record.pay_amount.as_deref().unwrap_or_default(),
            pay_token = escape_markdown(record.pay_token.as_deref().unwrap_or_default()),
            usd = record.usd_value.as_deref().unwrap_or_default(),
            contract = record.contract_address,
        )
    }

    fn details(&self, contract: &str, info: &EnrichmentInfo) -> String {
        let price = format_price(info.price_usd).unwrap_or_else(|_| "?".to_string());
        let name = info.display_name.as_deref().unwrap_or("Unknown");

        let mut out = format!(
            "\n💰 Price: [$ {price}]({chart}{contract})\
             \n📈 Market cap: ${mcap}\
             \n📊 24h volume: ${volume}\
             \n👥 Holders: {holders}\
             \n🛡 Audited: {audited}\
             \n🔗 [Search {name_text}]({search}{name_query})",
            price = price,
            chart = self.price_chart_url,
            contract = contract,
            mcap = format_compact_usd(info.market_cap_usd),
            volume = format_compact_usd(info.volume_24h_usd),
            holders = info.holder_count,
            audited = if info.is_audited { "Yes" } else { "No" },
            name_text = escape_markdown(name),
            search = self.search_url,
            name_query = encode(name),
        );

        let socials: Vec<String> = [
            info.website.as_deref().map(|w| format!("🌐 [Website]({})", w)),
            info.twitter_url.as_deref().map(|t| self.twitter_link(t)),
            info.telegram_url.as_deref().map(|t| format!("📢 [Telegram]({})", t)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !socials.is_empty() {
            out.push('\n');
            out.push_str(&socials.join(" ｜ "));
        }
        out
    }

    /// Points tweets, communities and profiles at the relay host; anything
    /// else is linked as given.
    pub fn twitter_link(&self, twitter: &str) -> String {
        let target = if let Some((_, id)) = twitter.rsplit_once("status/") {
            format!("{}{}", self.relay_url, id)
        } else if let Some((_, id)) = twitter.rsplit_once("/i/communities/") {
            format!("{}sq={}", self.relay_url, id)
        } else if twitter.starts_with("https://twitter.com/") || twitter.starts_with("https://x.com/") {
            let username = twitter.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
            format!("{}{}", self.relay_url, username)
        } else {
            twitter.to_string()
        };
        format!("[Twitter]({})", target)
    }

    fn share_button(&self, contract: &str, info: &EnrichmentInfo) -> LinkButton {
        let text = format!(
            "{} ${} {}",
            contract,
            info.display_name.as_deref().unwrap_or("Unknown"),
            info.twitter_url.as_deref().unwrap_or_default()
        );
        LinkButton {
            label: "📤 Tweet".to_string(),
            url: format!("{}ft={}", self.relay_url, encode(text.trim())),
        }
    }

    fn action_buttons(&self, contract: &str) -> Vec<Vec<LinkButton>> {
        self.actions
            .iter()
            .map(|a| {
                vec![LinkButton {
                    label: a.label.clone(),
                    url: a.url.replace("{contract}", contract),
                }]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use crate::tests::common::{create_test_config, sample_enrichment, sample_record};

    fn composer() -> NotificationComposer {
        NotificationComposer::new(&create_test_config().links)
    }

    #[test]
    fn test_text_payload_without_chart() {
        let payload = composer().compose(&sample_record(), &Enrichment::Ready(sample_enrichment()), None);
        assert!(matches!(payload, OutboundPayload::Text { .. }));
        assert!(payload.image().is_none());
    }

    #[test]
    fn test_photo_payload_with_chart() {
        let chart = PathBuf::from("/tmp/kline.png");
        let payload = composer().compose(
            &sample_record(),
            &Enrichment::Ready(sample_enrichment()),
            Some(chart.clone()),
        );
        assert_eq!(payload.image(), Some(&chart));
        assert!(payload.text().contains("💰 Price: [$ 0.0₄123400]"));
    }

    #[test]
    fn test_failed_enrichment_keeps_placeholder() {
        let payload = composer().compose(
            &sample_record(),
            &Enrichment::Failed(ENRICHMENT_FAILED.to_string()),
            None,
        );
        assert!(payload.text().contains(ENRICHMENT_FAILED));
        assert!(payload.text().starts_with("🟢 Alice 🟢 Buy [FOO]"));
        // fixed actions only, no share button
        assert_eq!(payload.buttons().len(), 2);
    }

    #[test]
    fn test_summary_layout() {
        let summary = composer().summary(&sample_record());
        assert_eq!(
            summary,
            "🟢 Alice 🟢 Buy [FOO](https://search.example.com/sou=FOO)\n\
             💵 Paid: 0.5 SOL($ 350.00)\n\
             📋 Contract: AbCdEfGh12345678901234567890"
        );
    }

    #[test]
    fn test_summary_tolerates_blank_fields() {
        let record = TradeRecord {
            direction: Direction::Sell,
            trader_label: None,
            token: None,
            pay_amount: None,
            pay_token: None,
            usd_value: None,
            contract_address: "AbCdEfGh12345678901234567890".to_string(),
        };
        let summary = composer().summary(&record);
        assert!(summary.starts_with("🔴  🔴 Sell []"));
        assert!(summary.ends_with("AbCdEfGh12345678901234567890"));
    }

    #[test]
    fn test_action_buttons_are_templated_and_share_is_appended() {
        let payload = composer().compose(&sample_record(), &Enrichment::Ready(sample_enrichment()), None);
        let buttons = payload.buttons();
        assert_eq!(buttons.len(), 3);
        assert_eq!(
            buttons[0][0].url,
            "https://t.me/SomeTradeBot?start=AbCdEfGh12345678901234567890"
        );
        assert!(buttons[2][0].url.starts_with("https://relay.example.com/ft=AbCdEfGh12345678901234567890"));
    }

    #[test]
    fn test_twitter_link_rewrites() {
        let c = composer();
        assert_eq!(
            c.twitter_link("https://x.com/foo/status/12345"),
            "[Twitter](https://relay.example.com/12345)"
        );
        assert_eq!(
            c.twitter_link("https://x.com/i/communities/999"),
            "[Twitter](https://relay.example.com/sq=999)"
        );
        assert_eq!(
            c.twitter_link("https://twitter.com/foo_coin/"),
            "[Twitter](https://relay.example.com/foo_coin)"
        );
        assert_eq!(c.twitter_link("https://foo.io/x"), "[Twitter](https://foo.io/x)");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c`d[e"), "a\\_b\\*c\\`d\\[e");
    }
}
