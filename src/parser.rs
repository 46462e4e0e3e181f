use crate::error::Result;
use crate::models::{Direction, TradeRecord};
use log::debug;
use regex::Regex;

const BUY_MARKER: &str = "bought";
const SELL_MARKER: &str = "sold";

const TRADER_PATTERN: &str = r"(?:🟢|🔴)\s*([^(]+?)\s*(?:\(|\s(?:bought|sold)\b)";
const TOKEN_PATTERN: &str = r"(?:bought|sold)\s+[\d.]+[kmbKMB]*\s+([^\s(]+)";
const PAYMENT_PATTERN: &str = r"\b(?:with|for)\s+([\d.]+[kmbKMB]*)\s+([^\s(]+)";
const USD_PATTERN: &str = r"\(\$([\d,.]+)\)";
const CONTRACT_PATTERN: &str = r"📋\s*([a-zA-Z0-9]{20,})";

/// Turns free-text trade notifications into [`TradeRecord`]s.
///
/// Every field rule runs against the raw message on its own; a rule that
/// does not match leaves its field empty. Only the direction marker and the
/// contract address are required.
#[derive(Debug, Clone)]
pub struct TradeMessageParser {
    trader: Regex,
    token: Regex,
    payment: Regex,
    usd: Regex,
    contract: Regex,
}

impl TradeMessageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            trader: Regex::new(TRADER_PATTERN)?,
            token: Regex::new(TOKEN_PATTERN)?,
            payment: Regex::new(PAYMENT_PATTERN)?,
            usd: Regex::new(USD_PATTERN)?,
            contract: Regex::new(CONTRACT_PATTERN)?,
        })
    }

    pub fn parse(&self, message: &str) -> Option<TradeRecord> {
        let Some(direction) = Self::direction(message) else {
            debug!("No direction marker, skipping message");
            return None;
        };

        let trader_label = self.trader_label(message);
        let token = self.token(message);
        let (pay_amount, pay_token) = self.payment(message);
        let usd_value = self.usd_value(message);

        let Some(contract_address) = self.contract(message) else {
            debug!("No contract address, skipping message");
            return None;
        };

        Some(TradeRecord {
            direction,
            trader_label,
            token,
            pay_amount,
            pay_token,
            usd_value,
            contract_address,
        })
    }

    fn direction(message: &str) -> Option<Direction> {
        if message.contains(BUY_MARKER) {
            Some(Direction::Buy)
        } else if message.contains(SELL_MARKER) {
            Some(Direction::Sell)
        } else {
            None
        }
    }

    fn trader_label(&self, message: &str) -> Option<String> {
        capture(&self.trader, message, 1).filter(|name| !name.is_empty())
    }

    fn token(&self, message: &str) -> Option<String> {
        capture(&self.token, message, 1)
    }

    fn payment(&self, message: &str) -> (Option<String>, Option<String>) {
        match self.payment.captures(message) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().trim().to_string()),
                caps.get(2).map(|m| m.as_str().trim().to_string()),
            ),
            None => (None, None),
        }
    }

    fn usd_value(&self, message: &str) -> Option<String> {
        capture(&self.usd, message, 1).map(|v| v.replace(',', ""))
    }

    fn contract(&self, message: &str) -> Option<String> {
        capture(&self.contract, message, 1)
    }
}

fn capture(re: &Regex, message: &str, group: usize) -> Option<String> {
    re.captures(message)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().trim().to_string())
}
