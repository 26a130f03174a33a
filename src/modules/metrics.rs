//! Price and network metrics fed by the periodic refresh

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Deserialize;

/// One asset quote from the price feed
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    #[serde(default)]
    pub change_24h: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub market_cap: f64,
}

impl PriceQuote {
    pub fn is_up(&self) -> bool {
        self.change_24h >= 0.0
    }
}

/// Latest quotes plus a bounded history per asset for sparklines
#[derive(Clone, Debug)]
pub struct PriceBoard {
    quotes: BTreeMap<String, PriceQuote>,
    /// Prices in cents, oldest first
    history: BTreeMap<String, Vec<u64>>,
    network: Option<serde_json::Value>,
    last_update: Option<DateTime<Local>>,
    max_len: usize,
}

impl Default for PriceBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceBoard {
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
            history: BTreeMap::new(),
            network: None,
            last_update: None,
            max_len: 100,
        }
    }

    pub fn apply_prices(&mut self, quotes: BTreeMap<String, PriceQuote>, at: DateTime<Local>) {
        for (asset, quote) in &quotes {
            let series = self.history.entry(asset.clone()).or_default();
            series.push((quote.price.max(0.0) * 100.0).round() as u64);
            if series.len() > self.max_len {
                series.remove(0);
            }
        }
        self.quotes = quotes;
        self.last_update = Some(at);
    }

    pub fn apply_network(&mut self, value: serde_json::Value) {
        self.network = Some(value);
    }

    pub fn quotes(&self) -> &BTreeMap<String, PriceQuote> {
        &self.quotes
    }

    pub fn history(&self, asset: &str) -> &[u64] {
        self.history.get(asset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn network(&self) -> Option<&serde_json::Value> {
        self.network.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
