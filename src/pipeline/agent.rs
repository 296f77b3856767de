//! One decision cycle: snapshot → spread → advisory → risk → execution → ledger

use alloy::primitives::Address;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};
use crate::{
    advisory::{AdvisoryContext, AdvisoryGate},
    arbitrage::SpreadAnalyzer,
    config::Config,
    errors::{BotError, BotResult, ErrorRecovery, RecoveryAction},
    events::EventBus,
    execution::ExecutionCoordinator,
    network::{pool_price, GasEstimator, PoolQuoteSource, PriceSource},
    risk::{PerformanceTracker, RiskValidator},
    types::{
        AgentEvent, CycleOutcome, ExecutionStatus, MarketSnapshot, Recommendation, RejectionStage,
        RiskState, SkipReason, TradeSkipped,
    },
    utils,
    validation::{validate_freshness, MarketDataLimits},
    volatility::VolatilityWindow,
};

/// Window the advisory volatility figure is computed over.
pub const VOLATILITY_WINDOW_SECS: u64 = 1800;

/// External market data capabilities.
#[derive(Clone)]
pub struct MarketSources {
    pub price: Arc<dyn PriceSource>,
    pub pool: Arc<dyn PoolQuoteSource>,
    pub gas: Arc<dyn GasEstimator>,
}

#[derive(Debug, Clone)]
pub struct MarketSettings {
    pub cex_symbol: String,
    pub base_token: Address,
    pub quote_token: Address,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub position_size: Decimal,
    pub swap_gas_units: u64,
    pub limits: MarketDataLimits,
}

impl MarketSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cex_symbol: config.cex_symbol.clone(),
            base_token: config.base_token,
            quote_token: config.quote_token,
            base_decimals: config.base_decimals,
            quote_decimals: config.quote_decimals,
            position_size: config.position_size,
            swap_gas_units: config.swap_gas_units,
            limits: MarketDataLimits::from_config(config),
        }
    }
}

/// Result of one cycle: its outcome and the ledger the next cycle reads.
#[derive(Debug, Clone)]
pub struct CycleStep {
    pub outcome: CycleOutcome,
    pub state: RiskState,
}

pub struct Agent {
    sources: MarketSources,
    settings: MarketSettings,
    analyzer: SpreadAnalyzer,
    gate: AdvisoryGate,
    validator: RiskValidator,
    coordinator: ExecutionCoordinator,
    tracker: PerformanceTracker,
    volatility: VolatilityWindow,
    recovery: ErrorRecovery,
    events: EventBus,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sources: MarketSources,
        settings: MarketSettings,
        analyzer: SpreadAnalyzer,
        gate: AdvisoryGate,
        validator: RiskValidator,
        coordinator: ExecutionCoordinator,
        tracker: PerformanceTracker,
        events: EventBus,
    ) -> Self {
        Self {
            sources,
            settings,
            analyzer,
            gate,
            validator,
            coordinator,
            tracker,
            volatility: VolatilityWindow::new(VOLATILITY_WINDOW_SECS),
            recovery: ErrorRecovery::new(),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub fn recovery(&self) -> &ErrorRecovery {
        &self.recovery
    }

    /// Reads both venues and prices the swap's gas.
    pub async fn capture_snapshot(&mut self) -> BotResult<MarketSnapshot> {
        let quote = self.sources.price.get_price(&self.settings.cex_symbol).await?;
        validate_freshness(&quote, Utc::now(), &self.settings.limits)?;

        let dex_price = pool_price(
            self.sources.pool.as_ref(),
            self.settings.base_token,
            self.settings.quote_token,
            self.settings.base_decimals,
            self.settings.quote_decimals,
        )
        .await?;
        let gas = self.sources.gas.estimate_gas(self.settings.swap_gas_units).await?;

        self.volatility.add_price(quote.price);
        Ok(MarketSnapshot::new(quote.price, dex_price, gas.cost_in_quote))
    }

    /// Runs one full cycle against `state`. Returns `Err` only for errors
    /// that must stop the agent; every other path yields one outcome.
    pub async fn run_cycle(&mut self, state: &RiskState) -> BotResult<CycleStep> {
        let snapshot = match self.capture_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.absorb(e, state),
        };
        self.evaluate(snapshot, state).await
    }

    /// Runs the decision phases on an already captured snapshot.
    pub async fn evaluate(&mut self, snapshot: MarketSnapshot, state: &RiskState) -> BotResult<CycleStep> {
        let opportunity = match self.analyzer.analyze(&snapshot, self.settings.position_size) {
            Ok(opportunity) => opportunity,
            Err(e) => return self.absorb(e, state),
        };

        info!(
            "💹 CEX: {:.4} | DEX: {:.4} | Spread: {:.3}% | Net: {:.4} | Confidence: {} | {:?}",
            opportunity.cex_price,
            opportunity.dex_price,
            opportunity.spread_pct,
            opportunity.net_profit,
            opportunity.confidence,
            opportunity.recommendation
        );
        self.events.publish(AgentEvent::OpportunityDetected(opportunity.clone()));

        if opportunity.recommendation == Recommendation::Skip {
            return Ok(self.unchanged(
                state,
                CycleOutcome::Skipped {
                    reason: SkipReason::Unprofitable {
                        recommendation: opportunity.recommendation,
                        net_profit: opportunity.net_profit,
                    },
                },
            ));
        }
        utils::print_arbitrage_opportunity(&opportunity);

        let context = AdvisoryContext {
            volatility_pct: self.volatility.volatility_pct().unwrap_or(Decimal::ZERO),
            historical_win_rate_pct: state.win_rate_pct(),
            current_exposure: state.current_exposure,
        };
        let verdict = self.gate.evaluate(&opportunity, &context).await;
        if !verdict.allows_trade() {
            return Ok(self.reject(state, RejectionStage::Advisory, &opportunity.id, vec![verdict.reason()]));
        }
        debug!("Advisory verdict: {}", verdict.reason());

        let assessment = self.validator.validate(opportunity.position_size, state);
        if !assessment.warnings.is_empty() || !assessment.is_valid {
            self.events.publish(AgentEvent::RiskWarning(assessment.clone()));
        }
        if !assessment.is_valid {
            return Ok(self.reject(state, RejectionStage::Risk, &opportunity.id, assessment.issues));
        }

        let execution = match self.coordinator.execute(&opportunity).await {
            Ok(execution) => execution,
            Err(e) => return self.absorb(e, state),
        };
        utils::print_trade_execution(&execution);
        self.events.publish(AgentEvent::TradeCompleted(execution.clone()));

        let next = self.tracker.record(state, &execution);
        let outcome = match execution.status {
            ExecutionStatus::Confirmed => CycleOutcome::Confirmed { execution },
            ExecutionStatus::Pending => CycleOutcome::Unresolved { execution },
            ExecutionStatus::Failed => CycleOutcome::Failed { execution },
        };
        Ok(CycleStep { outcome, state: next })
    }

    fn unchanged(&self, state: &RiskState, outcome: CycleOutcome) -> CycleStep {
        CycleStep {
            outcome,
            state: state.clone(),
        }
    }

    fn reject(&self, state: &RiskState, stage: RejectionStage, opportunity_id: &str, reasons: Vec<String>) -> CycleStep {
        warn!(opportunity_id, ?stage, "⛔ Trade skipped: {}", reasons.join("; "));
        self.events.publish(AgentEvent::TradeSkipped(TradeSkipped {
            opportunity_id: opportunity_id.to_string(),
            stage,
            reasons: reasons.clone(),
        }));
        self.unchanged(
            state,
            CycleOutcome::Rejected {
                stage,
                opportunity_id: opportunity_id.to_string(),
                reasons,
            },
        )
    }

    /// Classifies an error: transient ones end the cycle as skipped, fatal
    /// ones are handed back to the scheduler.
    fn absorb(&mut self, error: BotError, state: &RiskState) -> BotResult<CycleStep> {
        match self.recovery.handle_error(&error) {
            RecoveryAction::Shutdown { reason } => {
                error!("🛑 Fatal error: {}", reason);
                Err(error)
            }
            RecoveryAction::SkipCycle { log_level } => {
                if log_level == Level::WARN {
                    warn!("⚠️ Cycle skipped: {}", error);
                } else {
                    error!("Cycle skipped: {}", error);
                }
                let reason = match &error {
                    BotError::InvalidMarketData { .. } => SkipReason::InvalidMarketData {
                        reason: error.to_string(),
                    },
                    _ => SkipReason::DataUnavailable {
                        reason: error.to_string(),
                    },
                };
                Ok(self.unchanged(state, CycleOutcome::Skipped { reason }))
            }
        }
    }
}
