//! Folds execution results into the risk ledger

use chrono::Utc;
use rust_decimal::prelude::*;
use tracing::{info, warn};
use super::evaluate_breaker;
use crate::types::{ExecutionResult, ExecutionStatus, RiskLimits, RiskState, SettlementStatus};

/// Sole writer of [`RiskState`]. Every method returns the next state and
/// leaves the input untouched.
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    limits: RiskLimits,
}

impl PerformanceTracker {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn record(&self, state: &RiskState, result: &ExecutionResult) -> RiskState {
        let mut next = state.clone();

        // Outcome unknown: the position is open but not yet a win or a loss.
        if result.status == ExecutionStatus::Pending {
            next.current_exposure += result.position_size;
            warn!(
                opportunity_id = %result.opportunity_id,
                exposure = %next.current_exposure,
                "⏳ Unresolved trade counted as open exposure"
            );
            return next;
        }

        next.total_trades += 1;
        if result.profit > Decimal::ZERO {
            next.win_count += 1;
        } else {
            next.loss_count += 1;
        }
        next.total_profit += result.profit;
        next.daily_loss += result.profit.min(Decimal::ZERO);

        // A delivered settlement closes the position it opened.
        if result.status == ExecutionStatus::Confirmed
            && !matches!(result.settlement, SettlementStatus::Delivered { .. })
        {
            next.current_exposure += result.position_size;
        }

        next.circuit_breaker_active = evaluate_breaker(&next, &self.limits);
        if next.circuit_breaker_active && !state.circuit_breaker_active {
            warn!(
                daily_loss = %next.daily_loss,
                limit = %self.limits.daily_loss_limit(),
                "🚨 Circuit breaker tripped: daily loss limit exceeded"
            );
        }

        info!(
            trades = next.total_trades,
            wins = next.win_count,
            total_profit = %next.total_profit,
            exposure = %next.current_exposure,
            "📒 Risk state updated"
        );
        next
    }

    /// Reconciles an open position, e.g. after a failed settlement was
    /// delivered out of band.
    pub fn release_exposure(&self, state: &RiskState, amount: Decimal) -> RiskState {
        let mut next = state.clone();
        next.current_exposure = (next.current_exposure - amount.abs()).max(Decimal::ZERO);
        next
    }
}

/// Starts a new trading day: zeroes the daily loss and clears the breaker.
/// Cumulative totals and open exposure are kept.
pub fn daily_reset(state: &RiskState) -> RiskState {
    RiskState {
        daily_loss: Decimal::ZERO,
        circuit_breaker_active: false,
        last_reset: Utc::now(),
        ..state.clone()
    }
}
