//! Pre-trade risk validation

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::{debug, warn};
use crate::types::{RiskAssessment, RiskLimits, RiskState};

const OVERSIZE_PENALTY: u32 = 40;
const EXPOSURE_PENALTY: u32 = 30;
const DAILY_LOSS_PENALTY: u32 = 30;
const SIZE_WEIGHT: Decimal = dec!(20);
const EXPOSURE_WARNING_RATIO: Decimal = dec!(0.8);
const DAILY_LOSS_WARNING_RATIO: Decimal = dec!(0.5);

pub struct RiskValidator {
    limits: RiskLimits,
}

impl RiskValidator {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn validate(&self, position_size: Decimal, state: &RiskState) -> RiskAssessment {
        let assessment = assess_trade(position_size, state, &self.limits);
        if assessment.is_valid {
            debug!(
                risk_score = assessment.risk_score,
                exposure_after = %assessment.portfolio_exposure_after,
                "Risk check passed"
            );
        } else {
            warn!(
                risk_score = assessment.risk_score,
                issues = ?assessment.issues,
                "🛑 Risk check failed"
            );
        }
        assessment
    }
}

/// Scores a proposed trade against the current ledger. Any issue makes the
/// assessment invalid; warnings never block.
pub fn assess_trade(position_size: Decimal, state: &RiskState, limits: &RiskLimits) -> RiskAssessment {
    let exposure_after = state.current_exposure + position_size;
    let daily_loss_limit = limits.daily_loss_limit();
    let daily_loss = state.daily_loss.abs();
    let daily_loss_remaining = daily_loss_limit - daily_loss;

    if state.circuit_breaker_active {
        return RiskAssessment {
            is_valid: false,
            risk_score: 100,
            position_size,
            portfolio_exposure_after: exposure_after,
            daily_loss_remaining,
            issues: vec!["circuit breaker active".to_string()],
            warnings: Vec::new(),
        };
    }

    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let mut score: u32 = 0;

    if position_size <= Decimal::ZERO {
        issues.push(format!("position size {} must be positive", position_size));
        score += OVERSIZE_PENALTY;
    } else if position_size > limits.max_position_size {
        issues.push(format!(
            "position size {} exceeds maximum {}",
            position_size, limits.max_position_size
        ));
        score += OVERSIZE_PENALTY;
    } else if limits.max_position_size > Decimal::ZERO {
        let proportional = (position_size / limits.max_position_size * SIZE_WEIGHT).round();
        score += proportional.to_u32().unwrap_or(0);
    }

    let ceiling = limits.exposure_ceiling();
    if exposure_after > ceiling {
        issues.push(format!(
            "exposure after trade {} exceeds ceiling {}",
            exposure_after, ceiling
        ));
        score += EXPOSURE_PENALTY;
    } else if exposure_after > ceiling * EXPOSURE_WARNING_RATIO {
        warnings.push(format!(
            "exposure after trade {} is above {}% of ceiling {}",
            exposure_after,
            EXPOSURE_WARNING_RATIO * dec!(100),
            ceiling
        ));
    }

    if daily_loss > daily_loss_limit {
        issues.push(format!(
            "daily loss {} exceeds limit {}",
            daily_loss, daily_loss_limit
        ));
        score += DAILY_LOSS_PENALTY;
    } else if daily_loss > daily_loss_limit * DAILY_LOSS_WARNING_RATIO {
        warnings.push(format!(
            "daily loss {} is above half of limit {}",
            daily_loss, daily_loss_limit
        ));
    }

    RiskAssessment {
        is_valid: issues.is_empty(),
        risk_score: score.min(100) as u8,
        position_size,
        portfolio_exposure_after: exposure_after,
        daily_loss_remaining,
        issues,
        warnings,
    }
}
