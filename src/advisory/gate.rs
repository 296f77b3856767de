//! Advisory gate: second opinion with a confidence floor and fallback

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use super::AdvisoryService;
use crate::config::Config;
use crate::errors::BotResult;
use crate::types::{
    AdvisoryFallback, AdvisoryRequest, AdvisoryResponse, AdvisoryVerdict, ArbitrageOpportunity,
};

/// Context the gate sends alongside the opportunity.
#[derive(Debug, Clone, Default)]
pub struct AdvisoryContext {
    pub volatility_pct: Decimal,
    pub historical_win_rate_pct: Decimal,
    pub current_exposure: Decimal,
}

impl AdvisoryRequest {
    pub fn new(opportunity: &ArbitrageOpportunity, context: &AdvisoryContext) -> Self {
        Self {
            opportunity_id: opportunity.id.clone(),
            cex_price: opportunity.cex_price,
            dex_price: opportunity.dex_price,
            spread_pct: opportunity.spread_pct,
            gas_cost: opportunity.gas_cost,
            gross_profit: opportunity.gross_profit,
            net_profit: opportunity.net_profit,
            position_size: opportunity.position_size,
            rule_confidence: opportunity.confidence,
            volatility_pct: context.volatility_pct,
            historical_win_rate_pct: context.historical_win_rate_pct,
            current_exposure: context.current_exposure,
        }
    }
}

pub struct AdvisoryGate {
    service: Option<Arc<dyn AdvisoryService>>,
    confidence_floor: u8,
    timeout: Duration,
    fallback: AdvisoryFallback,
}

impl AdvisoryGate {
    pub fn new(
        service: Option<Arc<dyn AdvisoryService>>,
        confidence_floor: u8,
        timeout: Duration,
        fallback: AdvisoryFallback,
    ) -> Self {
        if service.is_none() {
            info!("ℹ️ Advisory gate disabled: decisions are rule-based only");
        }
        Self {
            service,
            confidence_floor,
            timeout,
            fallback,
        }
    }

    pub fn from_config(config: &Config, service: Option<Arc<dyn AdvisoryService>>) -> Self {
        Self::new(
            service,
            config.advisory_confidence_floor,
            Duration::from_secs(config.advisory_timeout_secs),
            config.advisory_fallback,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub async fn evaluate(&self, opportunity: &ArbitrageOpportunity, context: &AdvisoryContext) -> AdvisoryVerdict {
        let Some(service) = &self.service else {
            return AdvisoryVerdict::Bypassed;
        };

        let request = AdvisoryRequest::new(opportunity, context);
        let outcome: BotResult<AdvisoryResponse> =
            match tokio::time::timeout(self.timeout, service.advise(&request)).await {
                Ok(result) => result,
                Err(_) => Err(crate::errors::BotError::Advisory {
                    message: format!("timed out after {}ms", self.timeout.as_millis()),
                }),
            };

        match outcome {
            Ok(response) => self.judge(response),
            Err(e) => {
                warn!(opportunity_id = %opportunity.id, "⚠️ Advisory unavailable: {}", e);
                self.apply_fallback(opportunity.confidence, e.to_string())
            }
        }
    }

    fn judge(&self, response: AdvisoryResponse) -> AdvisoryVerdict {
        if response.should_execute && response.confidence >= self.confidence_floor {
            info!(confidence = response.confidence, "🤝 Advisory approved: {}", response.reasoning);
            AdvisoryVerdict::Approved {
                confidence: response.confidence,
                reasoning: response.reasoning,
            }
        } else {
            info!(
                confidence = response.confidence,
                should_execute = response.should_execute,
                "🙅 Advisory rejected: {}",
                response.reasoning
            );
            AdvisoryVerdict::Rejected {
                confidence: response.confidence,
                reasoning: response.reasoning,
                risk_note: response.risk_note,
            }
        }
    }

    fn apply_fallback(&self, rule_confidence: u8, error: String) -> AdvisoryVerdict {
        match self.fallback {
            AdvisoryFallback::ProceedRuleBased if rule_confidence >= self.confidence_floor => {
                AdvisoryVerdict::FallbackApproved { rule_confidence, error }
            }
            _ => AdvisoryVerdict::FallbackRejected { rule_confidence, error },
        }
    }
}
