//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use super::Venue;
use crate::errors::{BotError, BotResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Monitor,
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub buy_venue: Venue,
    pub sell_venue: Venue,
    pub cex_price: Decimal,
    pub dex_price: Decimal,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub spread_pct: Decimal,
    pub position_size: Decimal,
    pub gross_profit: Decimal,
    pub gas_cost: Decimal,
    pub net_profit: Decimal,
    pub confidence: u8,
    pub recommendation: Recommendation,
}

impl ArbitrageOpportunity {
    pub fn is_profitable(&self) -> bool {
        self.net_profit > Decimal::ZERO
    }

    pub fn direction(&self) -> String {
        format!("Buy on {} → Sell on {}", self.buy_venue, self.sell_venue)
    }
}

/// One step of the confidence table: spreads strictly below `below_pct`
/// map to `confidence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceStep {
    pub below_pct: Decimal,
    pub confidence: u8,
}

/// Step function from spread percentage to confidence (0-100).
///
/// Steps are sorted by threshold and confidences never decrease, so the
/// mapping is monotonic in the spread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBuckets {
    steps: Vec<ConfidenceStep>,
    top: u8,
}

impl Default for ConfidenceBuckets {
    fn default() -> Self {
        Self {
            steps: vec![
                ConfidenceStep { below_pct: dec!(0.3), confidence: 20 },
                ConfidenceStep { below_pct: dec!(0.5), confidence: 50 },
                ConfidenceStep { below_pct: dec!(1.0), confidence: 80 },
                ConfidenceStep { below_pct: dec!(2.0), confidence: 95 },
            ],
            top: 99,
        }
    }
}

impl ConfidenceBuckets {
    pub fn new(steps: Vec<ConfidenceStep>, top: u8) -> BotResult<Self> {
        if top > 100 {
            return Err(BotError::config(format!("confidence {} exceeds 100", top)));
        }
        for pair in steps.windows(2) {
            if pair[1].below_pct <= pair[0].below_pct {
                return Err(BotError::config("confidence thresholds must be strictly increasing"));
            }
            if pair[1].confidence < pair[0].confidence {
                return Err(BotError::config("confidence values must not decrease"));
            }
        }
        if let Some(last) = steps.last() {
            if last.confidence > top {
                return Err(BotError::config("top confidence must not be below the last step"));
            }
        }
        if steps.iter().any(|s| s.below_pct <= Decimal::ZERO) {
            return Err(BotError::config("confidence thresholds must be positive"));
        }
        Ok(Self { steps, top })
    }

    /// Parses `"0.3:20,0.5:50,1.0:80,2.0:95,*:99"`. The `*` entry sets the
    /// confidence above the last threshold.
    pub fn parse(table: &str) -> BotResult<Self> {
        let mut steps = Vec::new();
        let mut top = None;
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (threshold, confidence) = entry
                .split_once(':')
                .ok_or_else(|| BotError::config(format!("bad confidence bucket '{}'", entry)))?;
            let confidence: u8 = confidence
                .trim()
                .parse()
                .map_err(|_| BotError::config(format!("bad confidence value in '{}'", entry)))?;
            if threshold.trim() == "*" {
                top = Some(confidence);
            } else {
                let below_pct = Decimal::from_str(threshold.trim())
                    .map_err(|_| BotError::config(format!("bad threshold in '{}'", entry)))?;
                steps.push(ConfidenceStep { below_pct, confidence });
            }
        }
        let top = top.ok_or_else(|| BotError::config("confidence buckets need a '*:<confidence>' entry"))?;
        Self::new(steps, top)
    }

    pub fn confidence_for(&self, spread_pct: Decimal) -> u8 {
        self.steps
            .iter()
            .find(|step| spread_pct < step.below_pct)
            .map(|step| step.confidence)
            .unwrap_or(self.top)
    }

    pub fn steps(&self) -> &[ConfidenceStep] {
        &self.steps
    }
}
