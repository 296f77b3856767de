//! Risk ledger, limits and per-trade assessments

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Configured risk limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLimits {
    pub max_position_size: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub exposure_ceiling_multiplier: Decimal,
}

impl RiskLimits {
    /// Absolute daily loss allowed before trading halts.
    pub fn daily_loss_limit(&self) -> Decimal {
        self.max_position_size * (self.max_daily_loss_pct / dec!(100))
    }

    /// Maximum total exposure across open positions.
    pub fn exposure_ceiling(&self) -> Decimal {
        self.max_position_size * self.exposure_ceiling_multiplier
    }
}

/// Process-wide risk ledger. Owned by the scheduler and replaced after every
/// executed trade with the value returned by the performance tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskState {
    pub current_exposure: Decimal,
    /// Sum of realized losses today; zero or negative.
    pub daily_loss: Decimal,
    pub total_trades: u64,
    pub win_count: u64,
    /// Losing or failed executions.
    pub loss_count: u64,
    pub total_profit: Decimal,
    pub circuit_breaker_active: bool,
    pub last_reset: DateTime<Utc>,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            current_exposure: Decimal::ZERO,
            daily_loss: Decimal::ZERO,
            total_trades: 0,
            win_count: 0,
            loss_count: 0,
            total_profit: Decimal::ZERO,
            circuit_breaker_active: false,
            last_reset: Utc::now(),
        }
    }
}

impl RiskState {
    /// Win rate in percent; zero before the first trade.
    pub fn win_rate_pct(&self) -> Decimal {
        if self.total_trades == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.win_count) / Decimal::from(self.total_trades) * dec!(100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub is_valid: bool,
    pub risk_score: u8,
    pub position_size: Decimal,
    pub portfolio_exposure_after: Decimal,
    pub daily_loss_remaining: Decimal,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}
