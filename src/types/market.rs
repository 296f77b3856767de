//! Market inputs for a single decision cycle

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where one leg of the arbitrage is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Venue {
    Cex,
    Dex,
}

impl Venue {
    pub fn other(self) -> Self {
        match self {
            Venue::Cex => Venue::Dex,
            Venue::Dex => Venue::Cex,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Cex => write!(f, "CEX"),
            Venue::Dex => write!(f, "DEX"),
        }
    }
}

/// A price read from a quote source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Gas price and the cost of a swap expressed in the quote currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasEstimate {
    pub gas_price_wei: u128,
    pub gas_units: u64,
    pub cost_in_quote: Decimal,
}

/// Inputs of one decision cycle. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub cex_price: Decimal,
    pub dex_price: Decimal,
    pub gas_cost_estimate: Decimal,
    pub captured_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(cex_price: Decimal, dex_price: Decimal, gas_cost_estimate: Decimal) -> Self {
        Self {
            cex_price,
            dex_price,
            gas_cost_estimate,
            captured_at: Utc::now(),
        }
    }

    /// Price quoted by the given venue.
    pub fn price_at(&self, venue: Venue) -> Decimal {
        match venue {
            Venue::Cex => self.cex_price,
            Venue::Dex => self.dex_price,
        }
    }
}
