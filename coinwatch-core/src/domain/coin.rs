use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The market an alert watches: exchange plus currency pair.
///
/// Serialized exactly as the job service expects it inside `tickTrigger`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickTrigger {
    pub exchange: String,
    pub counter: String,
    pub base: String,
}

impl TickTrigger {
    pub fn new(
        exchange: impl Into<String>,
        base: impl Into<String>,
        counter: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            counter: counter.into(),
            base: base.into(),
        }
    }
}

impl fmt::Display for TickTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.exchange, self.base, self.counter)
    }
}

/// Errors from parsing a coin reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoinParseError {
    #[error("expected exchange:BASE/COUNTER, got '{0}'")]
    MissingExchange(String),

    #[error("expected BASE/COUNTER, got '{0}'")]
    InvalidPair(String),
}

/// A watched coin: the trigger plus the name shown in alert messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub trigger: TickTrigger,
    pub name: String,
}

impl Coin {
    /// Coin with the default display name, e.g. `BTC/USDT (binance)`.
    pub fn new(trigger: TickTrigger) -> Self {
        let name = default_name(&trigger);
        Self { trigger, name }
    }

    pub fn with_name(trigger: TickTrigger, name: impl Into<String>) -> Self {
        Self {
            trigger,
            name: name.into(),
        }
    }

    /// Parse `exchange:BASE/COUNTER`.
    pub fn parse(s: &str) -> Result<Self, CoinParseError> {
        let (exchange, pair) = s
            .split_once(':')
            .filter(|(exchange, _)| !exchange.trim().is_empty())
            .ok_or_else(|| CoinParseError::MissingExchange(s.to_string()))?;
        let (base, counter) = parse_pair(pair)?;
        Ok(Self::new(TickTrigger::new(exchange.trim(), base, counter)))
    }
}

impl FromStr for Coin {
    type Err = CoinParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coin::parse(s)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Split `BASE/COUNTER` into upper-cased currency codes.
pub fn parse_pair(pair: &str) -> Result<(String, String), CoinParseError> {
    let (base, counter) = pair
        .split_once('/')
        .ok_or_else(|| CoinParseError::InvalidPair(pair.to_string()))?;
    let base = base.trim();
    let counter = counter.trim();
    if base.is_empty() || counter.is_empty() || counter.contains('/') {
        return Err(CoinParseError::InvalidPair(pair.to_string()));
    }
    Ok((base.to_uppercase(), counter.to_uppercase()))
}

fn default_name(trigger: &TickTrigger) -> String {
    format!("{}/{} ({})", trigger.base, trigger.counter, trigger.exchange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exchange_and_pair() {
        let coin = Coin::parse("binance:btc/usdt").unwrap();
        assert_eq!(coin.trigger, TickTrigger::new("binance", "BTC", "USDT"));
        assert_eq!(coin.name, "BTC/USDT (binance)");
    }

    #[test]
    fn parse_rejects_missing_exchange() {
        assert_eq!(
            Coin::parse("BTC/USDT"),
            Err(CoinParseError::MissingExchange("BTC/USDT".into()))
        );
        assert!(matches!(
            Coin::parse(":BTC/USDT"),
            Err(CoinParseError::MissingExchange(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_pair() {
        assert!(matches!(
            Coin::parse("kraken:BTCUSD"),
            Err(CoinParseError::InvalidPair(_))
        ));
        assert!(matches!(
            Coin::parse("kraken:BTC/"),
            Err(CoinParseError::InvalidPair(_))
        ));
        assert!(matches!(
            Coin::parse("kraken:A/B/C"),
            Err(CoinParseError::InvalidPair(_))
        ));
    }

    #[test]
    fn trigger_serializes_with_wire_keys() {
        let json = serde_json::to_value(TickTrigger::new("gdax", "ETH", "EUR")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "exchange": "gdax", "counter": "EUR", "base": "ETH" })
        );
    }
}
