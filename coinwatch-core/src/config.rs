//! TOML configuration: composer defaults and the coin watchlist.
//!
//! ```toml
//! [composer]
//! allow_empty_submit = false
//! notification_level = "ALERT"
//!
//! [watchlist.binance]
//! "BTC/USDT" = {}
//! "ETH/BTC" = { name = "Ether" }
//! ```
//!
//! Every section is optional. Pair keys are `BASE/COUNTER` and are validated
//! at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{parse_pair, Coin, NotificationLevel, TickTrigger};

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid pair '{pair}' under exchange '{exchange}' (expected BASE/COUNTER)")]
    InvalidPair { exchange: String, pair: String },
}

/// Settings for alert sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Let a job with no valid branch through to the submitter.
    pub allow_empty_submit: bool,
    /// Level attached to composed alert notifications.
    pub notification_level: NotificationLevel,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            allow_empty_submit: false,
            notification_level: NotificationLevel::Alert,
        }
    }
}

/// Coins the dashboard watches, in exchange then pair order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    coins: Vec<Coin>,
}

impl Watchlist {
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn find(&self, exchange: &str, base: &str, counter: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| {
            c.trigger.exchange == exchange
                && c.trigger.base.eq_ignore_ascii_case(base)
                && c.trigger.counter.eq_ignore_ascii_case(counter)
        })
    }

    /// Look up a coin by trigger, falling back to the default display name.
    pub fn resolve(&self, trigger: &TickTrigger) -> Coin {
        self.find(&trigger.exchange, &trigger.base, &trigger.counter)
            .cloned()
            .unwrap_or_else(|| Coin::new(trigger.clone()))
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PairEntry {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    composer: ComposerConfig,
    watchlist: BTreeMap<String, BTreeMap<String, PairEntry>>,
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub composer: ComposerConfig,
    pub watchlist: Watchlist,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut coins = Vec::new();
        for (exchange, pairs) in raw.watchlist {
            for (pair, entry) in pairs {
                let (base, counter) = parse_pair(&pair).map_err(|_| ConfigError::InvalidPair {
                    exchange: exchange.clone(),
                    pair: pair.clone(),
                })?;
                let trigger = TickTrigger::new(exchange.clone(), base, counter);
                coins.push(match entry.name {
                    Some(name) => Coin::with_name(trigger, name),
                    None => Coin::new(trigger),
                });
            }
        }

        tracing::debug!(coins = coins.len(), "config loaded");
        Ok(Self {
            composer: raw.composer,
            watchlist: Watchlist { coins },
        })
    }
}
