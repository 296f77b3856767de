//! Events pushed to external observers (dashboards, journals)

use serde::Serialize;
use super::{ArbitrageOpportunity, ExecutionResult, RejectionStage, RiskAssessment, SwapOrder};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum AgentEvent {
    OpportunityDetected(ArbitrageOpportunity),
    TradeExecuting(SwapOrder),
    TradeCompleted(ExecutionResult),
    TradeSkipped(TradeSkipped),
    RiskWarning(RiskAssessment),
}

impl AgentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AgentEvent::OpportunityDetected(_) => "opportunity-detected",
            AgentEvent::TradeExecuting(_) => "trade-executing",
            AgentEvent::TradeCompleted(_) => "trade-completed",
            AgentEvent::TradeSkipped(_) => "trade-skipped",
            AgentEvent::RiskWarning(_) => "risk-warning",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeSkipped {
    pub opportunity_id: String,
    pub stage: RejectionStage,
    pub reasons: Vec<String>,
}

/// Event plus delivery metadata. `timestamp_ms` strictly increases across
/// envelopes published by the same bus.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub event: AgentEvent,
}
