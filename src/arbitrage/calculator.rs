//! Arbitrage opportunity calculation

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::config::Config;
use crate::errors::BotResult;
use crate::types::{ArbitrageOpportunity, ConfidenceBuckets, MarketSnapshot, Recommendation, Venue};
use crate::validation::{validate_price_pair, MarketDataLimits};

/// Turns a market snapshot into a scored opportunity. Pure: no I/O.
#[derive(Debug, Clone)]
pub struct SpreadAnalyzer {
    buckets: ConfidenceBuckets,
    high_confidence_threshold: u8,
    limits: MarketDataLimits,
}

impl SpreadAnalyzer {
    pub fn new(buckets: ConfidenceBuckets, high_confidence_threshold: u8, limits: MarketDataLimits) -> Self {
        Self {
            buckets,
            high_confidence_threshold,
            limits,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.confidence_buckets.clone(),
            config.high_confidence_threshold,
            MarketDataLimits::from_config(config),
        )
    }

    pub fn analyze(&self, snapshot: &MarketSnapshot, position_size: Decimal) -> BotResult<ArbitrageOpportunity> {
        validate_price_pair(snapshot.cex_price, snapshot.dex_price, &self.limits)?;
        Ok(analyze_spread(
            snapshot,
            position_size,
            &self.buckets,
            self.high_confidence_threshold,
        ))
    }
}

/// Core spread arithmetic. Callers must have validated the prices; both are
/// assumed positive.
pub fn analyze_spread(
    snapshot: &MarketSnapshot,
    position_size: Decimal,
    buckets: &ConfidenceBuckets,
    high_confidence_threshold: u8,
) -> ArbitrageOpportunity {
    // Ties buy on the CEX.
    let buy_venue = if snapshot.dex_price < snapshot.cex_price {
        Venue::Dex
    } else {
        Venue::Cex
    };
    let sell_venue = buy_venue.other();
    let buy_price = snapshot.price_at(buy_venue);
    let sell_price = snapshot.price_at(sell_venue);

    let spread_pct = (sell_price - buy_price) / buy_price * dec!(100);
    let gross_profit = position_size * (sell_price / buy_price - Decimal::ONE);
    let net_profit = gross_profit - snapshot.gas_cost_estimate;

    let confidence = buckets.confidence_for(spread_pct);
    let recommendation = recommend(net_profit, confidence, high_confidence_threshold);

    ArbitrageOpportunity {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        buy_venue,
        sell_venue,
        cex_price: snapshot.cex_price,
        dex_price: snapshot.dex_price,
        buy_price,
        sell_price,
        spread_pct,
        position_size,
        gross_profit,
        gas_cost: snapshot.gas_cost_estimate,
        net_profit,
        confidence,
        recommendation,
    }
}

pub fn recommend(net_profit: Decimal, confidence: u8, high_confidence_threshold: u8) -> Recommendation {
    if net_profit <= Decimal::ZERO {
        Recommendation::Skip
    } else if confidence > high_confidence_threshold {
        Recommendation::Buy
    } else {
        Recommendation::Monitor
    }
}
