use serde::{Deserialize, Serialize};
use std::fmt;

pub type Symbol = String;
pub type Price = f64;
pub type Volume = u64;
pub type MarketCap = u64;

/// A record that carries its own ordering key.
///
/// The tree orders records by this key and never looks at anything else,
/// so the key must not change while the record is stored in a tree.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// One tracked instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: Symbol,
    pub price: Price,
    pub volume: Volume,
    pub market_cap: MarketCap,
}

impl Stock {
    pub fn new(symbol: impl Into<Symbol>, price: Price, volume: Volume, market_cap: MarketCap) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            market_cap,
        }
    }

    /// Overwrite the market fields, leaving the symbol untouched
    pub fn apply_quote(&mut self, price: Price, volume: Volume, market_cap: MarketCap) {
        self.price = price;
        self.volume = volume;
        self.market_cap = market_cap;
    }
}

impl Keyed for Stock {
    fn key(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stock [symbol={}, price={:.2}, volume={}, market_cap={}]",
            self.symbol, self.price, self.volume, self.market_cap
        )
    }
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOutcome::Added => write!(f, "added"),
            UpsertOutcome::Updated => write!(f, "updated"),
        }
    }
}
