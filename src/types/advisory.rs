//! Advisory (second-opinion) request and response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Market context sent to the advisory service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub opportunity_id: String,
    pub cex_price: Decimal,
    pub dex_price: Decimal,
    pub spread_pct: Decimal,
    pub gas_cost: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub position_size: Decimal,
    pub rule_confidence: u8,
    pub volatility_pct: Decimal,
    pub historical_win_rate_pct: Decimal,
    pub current_exposure: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryResponse {
    pub should_execute: bool,
    #[serde(deserialize_with = "clamped_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, alias = "riskAssessment")]
    pub risk_note: String,
}

/// Accepts any JSON number and clamps it into 0-100.
fn clamped_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Err(serde::de::Error::custom("confidence is NaN"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// What the gate does when the advisory service fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryFallback {
    /// Fail closed: the opportunity is rejected.
    Reject,
    /// Proceed only if the rule-based confidence meets the advisory floor.
    ProceedRuleBased,
}

impl Default for AdvisoryFallback {
    fn default() -> Self {
        AdvisoryFallback::Reject
    }
}

impl FromStr for AdvisoryFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(AdvisoryFallback::Reject),
            "proceed" | "proceed_rule_based" => Ok(AdvisoryFallback::ProceedRuleBased),
            other => Err(format!("unknown advisory fallback '{}'", other)),
        }
    }
}

/// Outcome of the advisory gate for one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AdvisoryVerdict {
    /// No advisory service configured.
    Bypassed,
    Approved {
        confidence: u8,
        reasoning: String,
    },
    Rejected {
        confidence: u8,
        reasoning: String,
        risk_note: String,
    },
    /// Service failed; the fallback let the opportunity through.
    FallbackApproved {
        rule_confidence: u8,
        error: String,
    },
    /// Service failed; the fallback rejected the opportunity.
    FallbackRejected {
        rule_confidence: u8,
        error: String,
    },
}

impl AdvisoryVerdict {
    pub fn allows_trade(&self) -> bool {
        matches!(
            self,
            AdvisoryVerdict::Bypassed
                | AdvisoryVerdict::Approved { .. }
                | AdvisoryVerdict::FallbackApproved { .. }
        )
    }

    /// Human readable reason, attached to rejections for audit.
    pub fn reason(&self) -> String {
        match self {
            AdvisoryVerdict::Bypassed => "advisory gate disabled".to_string(),
            AdvisoryVerdict::Approved { confidence, .. } => {
                format!("advisory approved ({}% confidence)", confidence)
            }
            AdvisoryVerdict::Rejected { confidence, reasoning, .. } => {
                format!("advisory rejected ({}% confidence): {}", confidence, reasoning)
            }
            AdvisoryVerdict::FallbackApproved { rule_confidence, error } => format!(
                "advisory unavailable ({}), rule confidence {}% accepted",
                error, rule_confidence
            ),
            AdvisoryVerdict::FallbackRejected { rule_confidence, error } => format!(
                "advisory unavailable ({}), rejected by fallback (rule confidence {}%)",
                error, rule_confidence
            ),
        }
    }
}
