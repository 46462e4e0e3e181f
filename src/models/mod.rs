use serde::{Deserialize, Serialize};

pub mod market;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Buy => "🟢",
            Direction::Sell => "🔴",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
        }
    }
}

/// One parsed trade notification. Only `contract_address` is guaranteed;
/// everything else is filled on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,
    pub trader_label: Option<String>,
    pub token: Option<String>,
    /// Raw amount as written, magnitude suffix included ("1.2k").
    pub pay_amount: Option<String>,
    pub pay_token: Option<String>,
    /// Dollar value with thousands separators removed.
    pub usd_value: Option<String>,
    pub contract_address: String,
}
