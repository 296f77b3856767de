//! Price validation functions

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::config::Config;
use crate::errors::{BotError, BotResult};
use crate::types::{PriceQuote, Venue};

/// Bounds a price pair must satisfy before it is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataLimits {
    pub min_valid_price: Decimal,
    pub max_deviation_pct: Decimal,
    pub staleness_secs: u64,
}

impl MarketDataLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_valid_price: config.min_valid_price,
            max_deviation_pct: config.max_price_deviation_pct,
            staleness_secs: config.price_staleness_secs,
        }
    }
}

impl Default for MarketDataLimits {
    fn default() -> Self {
        Self {
            min_valid_price: crate::config::MIN_VALID_PRICE,
            max_deviation_pct: crate::config::MAX_PRICE_DEVIATION_PCT,
            staleness_secs: crate::config::PRICE_STALENESS_SECONDS,
        }
    }
}

pub fn validate_price(price: Decimal, venue: Venue, limits: &MarketDataLimits) -> BotResult<()> {
    if price <= dec!(0) {
        return Err(BotError::invalid_data(&venue.to_string(), price, "price is zero or negative"));
    }

    if price <= limits.min_valid_price {
        return Err(BotError::invalid_data(
            &venue.to_string(),
            price,
            format!("price at or below sanity floor {}", limits.min_valid_price),
        ));
    }

    Ok(())
}

/// Rejects price pairs that disagree by more than the plausibility ceiling.
/// Such gaps come from broken feeds or mismatched pairs, not arbitrage.
pub fn validate_price_pair(
    cex_price: Decimal,
    dex_price: Decimal,
    limits: &MarketDataLimits,
) -> BotResult<()> {
    validate_price(cex_price, Venue::Cex, limits)?;
    validate_price(dex_price, Venue::Dex, limits)?;

    let low = cex_price.min(dex_price);
    let deviation_pct = (cex_price - dex_price).abs() / low * dec!(100);
    if deviation_pct > limits.max_deviation_pct {
        return Err(BotError::invalid_data(
            "CEX/DEX",
            deviation_pct.round_dp(2),
            format!(
                "cross-venue deviation {:.2}% exceeds {}% (cex {}, dex {})",
                deviation_pct, limits.max_deviation_pct, cex_price, dex_price
            ),
        ));
    }

    Ok(())
}

pub fn validate_freshness(quote: &PriceQuote, now: DateTime<Utc>, limits: &MarketDataLimits) -> BotResult<()> {
    let age = now.signed_duration_since(quote.timestamp);
    if age.num_seconds() > limits.staleness_secs as i64 {
        return Err(BotError::invalid_data(
            &quote.symbol,
            quote.price,
            format!("quote is {}s old (limit {}s)", age.num_seconds(), limits.staleness_secs),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn rejects_implausible_price_pair() {
        let limits = MarketDataLimits::default();
        let err = validate_price_pair(dec!(0.0850), dec!(2.00), &limits).unwrap_err();
        assert!(matches!(err, BotError::InvalidMarketData { .. }));
    }

    #[test]
    fn accepts_close_prices() {
        let limits = MarketDataLimits::default();
        assert!(validate_price_pair(dec!(3000), dec!(3015), &limits).is_ok());
        assert!(validate_price_pair(dec!(3000), dec!(3000), &limits).is_ok());
    }

    #[test]
    fn rejects_prices_at_floor() {
        let limits = MarketDataLimits::default();
        assert!(validate_price(dec!(0), Venue::Cex, &limits).is_err());
        assert!(validate_price(dec!(0.0001), Venue::Dex, &limits).is_err());
        assert!(validate_price(dec!(0.0002), Venue::Dex, &limits).is_ok());
    }

    #[test]
    fn rejects_stale_quotes() {
        let limits = MarketDataLimits::default();
        let now = Utc::now();
        let quote = PriceQuote {
            symbol: "ETHUSDC".into(),
            price: dec!(3000),
            timestamp: now - Duration::seconds(limits.staleness_secs as i64 + 5),
        };
        assert!(validate_freshness(&quote, now, &limits).is_err());

        let fresh = PriceQuote { timestamp: now, ..quote };
        assert!(validate_freshness(&fresh, now, &limits).is_ok());
    }
}
