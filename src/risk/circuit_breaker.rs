//! Daily-loss circuit breaker

use rust_decimal::Decimal;
use crate::types::{RiskLimits, RiskState};

/// True once today's realized loss is strictly beyond the limit.
pub fn loss_limit_breached(daily_loss: Decimal, limits: &RiskLimits) -> bool {
    daily_loss < -limits.daily_loss_limit()
}

/// Next breaker state. Latching: once active it stays active until
/// [`super::daily_reset`] clears it.
pub fn evaluate_breaker(state: &RiskState, limits: &RiskLimits) -> bool {
    state.circuit_breaker_active || loss_limit_breached(state.daily_loss, limits)
}
