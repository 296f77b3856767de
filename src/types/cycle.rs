//! Terminal outcome of one decision cycle

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::{ExecutionResult, Recommendation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStage {
    Advisory,
    Risk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Prices were valid but the spread does not pay for itself.
    Unprofitable {
        recommendation: Recommendation,
        net_profit: Decimal,
    },
    /// Upstream feed produced data that cannot be evaluated.
    InvalidMarketData { reason: String },
    /// A transient fetch or parse failure ended the cycle early.
    DataUnavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    Skipped {
        reason: SkipReason,
    },
    Rejected {
        stage: RejectionStage,
        opportunity_id: String,
        reasons: Vec<String>,
    },
    Failed {
        execution: ExecutionResult,
    },
    /// Sent, but no receipt before the confirmation timeout.
    Unresolved {
        execution: ExecutionResult,
    },
    Confirmed {
        execution: ExecutionResult,
    },
}

impl CycleOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            CycleOutcome::Skipped { .. } => "skipped",
            CycleOutcome::Rejected { .. } => "rejected",
            CycleOutcome::Failed { .. } => "failed",
            CycleOutcome::Unresolved { .. } => "unresolved",
            CycleOutcome::Confirmed { .. } => "confirmed",
        }
    }

    pub fn reason(&self) -> String {
        match self {
            CycleOutcome::Skipped { reason } => match reason {
                SkipReason::Unprofitable { recommendation, net_profit } => {
                    format!("unprofitable ({:?}, net {:.4})", recommendation, net_profit)
                }
                SkipReason::InvalidMarketData { reason } => format!("invalid market data: {}", reason),
                SkipReason::DataUnavailable { reason } => format!("data unavailable: {}", reason),
            },
            CycleOutcome::Rejected { stage, reasons, .. } => {
                format!("{:?} rejection: {}", stage, reasons.join("; "))
            }
            CycleOutcome::Failed { execution } => execution
                .error_message
                .clone()
                .unwrap_or_else(|| "execution failed".to_string()),
            CycleOutcome::Unresolved { execution } => format!(
                "trade {} unresolved, position held open",
                execution.tx_ref.as_deref().unwrap_or("unknown")
            ),
            CycleOutcome::Confirmed { execution } => {
                if execution.is_partial_failure() {
                    "trade confirmed, settlement failed".to_string()
                } else {
                    "trade confirmed and settled".to_string()
                }
            }
        }
    }

    pub fn execution(&self) -> Option<&ExecutionResult> {
        match self {
            CycleOutcome::Failed { execution }
            | CycleOutcome::Unresolved { execution }
            | CycleOutcome::Confirmed { execution } => Some(execution),
            _ => None,
        }
    }
}

/// One line of the cycle journal.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: CycleOutcome,
}
