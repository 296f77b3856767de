//! Rolling price window used as advisory context

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use std::collections::VecDeque;
use tracing::warn;

pub const MIN_VOLATILITY_SAMPLES: usize = 5;

pub struct VolatilityWindow {
    window: VecDeque<(DateTime<Utc>, f64)>,
    max_age: Duration,
    min_samples: usize,
}

impl VolatilityWindow {
    pub fn new(max_age_secs: u64) -> Self {
        VolatilityWindow {
            window: VecDeque::new(),
            max_age: Duration::seconds(max_age_secs as i64),
            min_samples: MIN_VOLATILITY_SAMPLES,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.max(2);
        self
    }

    pub fn add_price(&mut self, price: Decimal) {
        self.add_price_at(Utc::now(), price);
    }

    pub fn add_price_at(&mut self, at: DateTime<Utc>, price: Decimal) {
        let Some(price) = price.to_f64() else {
            warn!("Dropping price {} that does not fit in f64", price);
            return;
        };
        self.window.push_back((at, price));

        while let Some((timestamp, _)) = self.window.front() {
            if *timestamp > at {
                warn!("Encountered a timestamp in the future: {:?}", timestamp);
                self.window.pop_front();
            } else if at - *timestamp > self.max_age {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Population standard deviation of the window as a percentage of its
    /// mean. `None` until enough samples have been collected.
    pub fn volatility_pct(&self) -> Option<Decimal> {
        if self.window.len() < self.min_samples {
            return None;
        }

        let prices: Vec<f64> = self.window.iter().map(|(_, price)| *price).collect();
        let mean: f64 = prices.iter().sum::<f64>() / prices.len() as f64;
        if mean <= 0.0 {
            return None;
        }
        let variance: f64 = prices.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / prices.len() as f64;

        Decimal::from_f64((variance.sqrt() / mean) * 100.0).map(|pct| pct.round_dp(4))
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn needs_minimum_samples() {
        let mut window = VolatilityWindow::new(600);
        for _ in 0..4 {
            window.add_price(dec!(3000));
        }
        assert_eq!(window.volatility_pct(), None);
        window.add_price(dec!(3000));
        assert_eq!(window.volatility_pct(), Some(Decimal::ZERO));
    }

    #[test]
    fn evicts_old_samples() {
        let mut window = VolatilityWindow::new(60).with_min_samples(2);
        let start = Utc::now();
        window.add_price_at(start, dec!(100));
        window.add_price_at(start + Duration::seconds(30), dec!(110));
        window.add_price_at(start + Duration::seconds(90), dec!(120));
        assert_eq!(window.sample_count(), 2);
    }

    #[test]
    fn measures_dispersion_relative_to_mean() {
        let mut window = VolatilityWindow::new(600).with_min_samples(2);
        window.add_price(dec!(90));
        window.add_price(dec!(110));
        // mean 100, std dev 10
        assert_eq!(window.volatility_pct(), Some(dec!(10)));
    }
}
