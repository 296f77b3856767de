//! Trade execution: order building, submission and settlement

use alloy::primitives::Address;
use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use super::ChainSubmitter;
use crate::{
    config::Config,
    errors::{BotError, BotResult},
    events::EventBus,
    settlement::SettlementSigner,
    types::{
        is_unset, AgentEvent, ArbitrageOpportunity, ExecutionResult, ReceiptStatus, SettlementStatus,
        SwapOrder, TradePhase, TradeReceipt, TradeType, Venue,
    },
    utils::{from_base_units, to_base_units},
};

/// Static parameters for building orders.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub base_token: Address,
    pub quote_token: Address,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub recipient: Address,
    pub slippage_bps: u32,
    pub trade_gas_limit: u64,
    /// Gas units the opportunity's gas estimate was priced for.
    pub estimated_gas_units: u64,
}

impl ExecutionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_token: config.base_token,
            quote_token: config.quote_token,
            base_decimals: config.base_decimals,
            quote_decimals: config.quote_decimals,
            recipient: config.recipient,
            slippage_bps: config.slippage_bps,
            trade_gas_limit: config.trade_gas_limit,
            estimated_gas_units: config.swap_gas_units,
        }
    }

    fn slippage_factor(&self) -> Decimal {
        Decimal::ONE - Decimal::from(self.slippage_bps) / dec!(10000)
    }
}

pub fn trade_type_for(opportunity: &ArbitrageOpportunity) -> TradeType {
    match opportunity.buy_venue {
        Venue::Dex => TradeType::BuyDexSellCex,
        Venue::Cex => TradeType::BuyCexSellDex,
    }
}

/// Builds the on-chain leg. Buying on the DEX swaps quote into base;
/// selling on the DEX swaps base (bought on the CEX) into quote.
pub fn build_order(opportunity: &ArbitrageOpportunity, settings: &ExecutionSettings) -> BotResult<SwapOrder> {
    let trade_type = trade_type_for(opportunity);
    let size = opportunity.position_size;

    let (token_in, token_out, amount_in, amount_in_decimals, expected_out, out_decimals) = match trade_type {
        TradeType::BuyDexSellCex => (
            settings.quote_token,
            settings.base_token,
            size,
            settings.quote_decimals,
            size / opportunity.dex_price,
            settings.base_decimals,
        ),
        TradeType::BuyCexSellDex => {
            let base_amount = size / opportunity.cex_price;
            (
                settings.base_token,
                settings.quote_token,
                base_amount,
                settings.base_decimals,
                base_amount * opportunity.dex_price,
                settings.quote_decimals,
            )
        }
    };

    Ok(SwapOrder {
        opportunity_id: opportunity.id.clone(),
        trade_type,
        token_in,
        token_out,
        path: vec![token_in, token_out],
        amount_in: to_base_units(amount_in, amount_in_decimals)?,
        min_amount_out: to_base_units(expected_out * settings.slippage_factor(), out_decimals)?,
        recipient: settings.recipient,
        gas_limit: settings.trade_gas_limit,
    })
}

/// Checks an order before anything is signed or submitted.
pub fn validate_order(order: &SwapOrder) -> BotResult<()> {
    let invalid = |message: String| Err(BotError::Execution { message });

    if is_unset(&order.token_in) || is_unset(&order.token_out) {
        return invalid("token address is unset".to_string());
    }
    if is_unset(&order.recipient) {
        return invalid("recipient address is unset".to_string());
    }
    if order.path.len() < 2 {
        return invalid(format!("swap path needs at least 2 hops, got {}", order.path.len()));
    }
    if order.path.first() != Some(&order.token_in) || order.path.last() != Some(&order.token_out) {
        return invalid("swap path does not run from token_in to token_out".to_string());
    }
    if order.path.iter().any(is_unset) {
        return invalid("swap path contains an unset address".to_string());
    }
    if order.path.windows(2).any(|hop| hop[0] == hop[1]) {
        return invalid("swap path repeats a token".to_string());
    }
    if order.amount_in.is_zero() || order.min_amount_out.is_zero() {
        return invalid("swap amounts must be positive".to_string());
    }
    if order.gas_limit == 0 {
        return invalid("gas limit must be positive".to_string());
    }
    Ok(())
}

/// Drives one approved opportunity through `Built → Submitted →
/// {Confirmed | Failed}` and settles confirmed trades. A trade with no
/// receipt before the timeout stays `Submitted`.
pub struct ExecutionCoordinator {
    submitter: Arc<dyn ChainSubmitter>,
    signer: SettlementSigner,
    settings: ExecutionSettings,
    events: EventBus,
}

impl ExecutionCoordinator {
    pub fn new(
        submitter: Arc<dyn ChainSubmitter>,
        signer: SettlementSigner,
        settings: ExecutionSettings,
        events: EventBus,
    ) -> Self {
        Self {
            submitter,
            signer,
            settings,
            events,
        }
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Executes at most one trade submission and at most one settlement.
    /// Only a signing error before submission is returned as `Err`; once a
    /// trade is sent every outcome is an `ExecutionResult`.
    pub async fn execute(&mut self, opportunity: &ArbitrageOpportunity) -> BotResult<ExecutionResult> {
        let started = Instant::now();
        let phase = TradePhase::Built;

        let order = match build_order(opportunity, &self.settings).and_then(|order| {
            validate_order(&order)?;
            Ok(order)
        }) {
            Ok(order) => order,
            Err(e) => {
                warn!(opportunity_id = %opportunity.id, "❌ Order rejected before submission: {}", e);
                let failed = phase.advance(TradePhase::Failed)?;
                return Ok(self.failed_result(opportunity, failed, None, 0, Decimal::ZERO, e.to_string(), started));
            }
        };

        let payload = self.signer.sign(order.token_out, order.min_amount_out, order.recipient)?;

        self.events.publish(AgentEvent::TradeExecuting(order.clone()));
        let phase = phase.advance(TradePhase::Submitted)?;
        info!(
            opportunity_id = %opportunity.id,
            trade_type = ?order.trade_type,
            amount_in = %order.amount_in,
            min_amount_out = %order.min_amount_out,
            "🚀 Submitting trade"
        );

        let receipt = match self.submitter.submit_trade(&order).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(opportunity_id = %opportunity.id, "❌ Trade submission failed: {}", e);
                let failed = phase.advance(TradePhase::Failed)?;
                return Ok(self.failed_result(opportunity, failed, None, 0, Decimal::ZERO, e.to_string(), started));
            }
        };

        let gas_cost = self.realized_gas_cost(opportunity, receipt.gas_used);

        match receipt.status {
            ReceiptStatus::Confirmed => {}
            ReceiptStatus::Reverted => {
                error!(opportunity_id = %opportunity.id, tx = %receipt.tx_ref, "❌ Trade reverted");
                let failed = phase.advance(TradePhase::Failed)?;
                return Ok(self.failed_result(
                    opportunity,
                    failed,
                    Some(receipt.tx_ref.clone()),
                    receipt.gas_used,
                    gas_cost,
                    format!("transaction {} reverted", receipt.tx_ref),
                    started,
                ));
            }
            ReceiptStatus::Unresolved => {
                warn!(
                    opportunity_id = %opportunity.id,
                    tx = %receipt.tx_ref,
                    "⏳ Trade unresolved, keeping position open"
                );
                return Ok(self.unresolved_result(opportunity, phase, receipt.tx_ref, started));
            }
        }
        let phase = phase.advance(TradePhase::Confirmed)?;
        let profit = self.realized_profit(opportunity, &order, &receipt, gas_cost);

        // From here on the trade is on-chain; errors only affect the settlement.
        let settlement = match self.signer.consume_nonce(&payload) {
            Ok(()) => match self.submitter.submit_settlement(&payload).await {
                Ok(tx_ref) => SettlementStatus::Delivered { tx_ref },
                Err(e) => {
                    error!(opportunity_id = %opportunity.id, "⚠️ Settlement failed after confirmed trade: {}", e);
                    SettlementStatus::Failed { error: e.to_string() }
                }
            },
            Err(e) => {
                error!(opportunity_id = %opportunity.id, "🚨 Settlement withheld after confirmed trade: {}", e);
                SettlementStatus::Failed { error: e.to_string() }
            }
        };

        let result = ExecutionResult {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id: opportunity.id.clone(),
            timestamp: Utc::now(),
            trade_type: order.trade_type,
            status: phase.status(),
            phase,
            tx_ref: Some(receipt.tx_ref),
            position_size: opportunity.position_size,
            expected_profit: opportunity.net_profit,
            profit,
            gas_used: receipt.gas_used,
            gas_cost,
            efficiency: efficiency(profit, gas_cost),
            settlement,
            execution_time_ms: started.elapsed().as_millis() as u64,
            error_message: None,
        };
        info!(
            opportunity_id = %opportunity.id,
            profit = %result.profit,
            efficiency = %result.efficiency,
            partial = result.is_partial_failure(),
            "✅ Trade confirmed"
        );
        Ok(result)
    }

    /// Scales the estimated gas cost by the gas actually used.
    fn realized_gas_cost(&self, opportunity: &ArbitrageOpportunity, gas_used: u64) -> Decimal {
        if gas_used == 0 || self.settings.estimated_gas_units == 0 {
            return Decimal::ZERO;
        }
        opportunity.gas_cost * Decimal::from(gas_used) / Decimal::from(self.settings.estimated_gas_units)
    }

    /// Profit from the amount actually received when the receipt reports
    /// one, otherwise from the analyzed gross profit.
    fn realized_profit(
        &self,
        opportunity: &ArbitrageOpportunity,
        order: &SwapOrder,
        receipt: &TradeReceipt,
        gas_cost: Decimal,
    ) -> Decimal {
        let estimated = opportunity.gross_profit - gas_cost;
        let Some(amount_out) = receipt.amount_out else {
            return estimated;
        };
        let output_value = match order.trade_type {
            // Base received on the DEX is sold on the CEX.
            TradeType::BuyDexSellCex => from_base_units(amount_out, self.settings.base_decimals)
                .and_then(|base| {
                    base.checked_mul(opportunity.cex_price)
                        .ok_or_else(|| BotError::Execution {
                            message: "received value exceeds decimal range".to_string(),
                        })
                }),
            TradeType::BuyCexSellDex => from_base_units(amount_out, self.settings.quote_decimals),
        };
        match output_value {
            Ok(value) => value - opportunity.position_size - gas_cost,
            Err(e) => {
                warn!(
                    opportunity_id = %opportunity.id,
                    amount_out = %amount_out,
                    "Falling back to estimated profit: {}", e
                );
                estimated
            }
        }
    }

    /// The swap was sent but its fate is unknown. The order's position is
    /// treated as open until reconciled.
    fn unresolved_result(
        &self,
        opportunity: &ArbitrageOpportunity,
        phase: TradePhase,
        tx_ref: String,
        started: Instant,
    ) -> ExecutionResult {
        ExecutionResult {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id: opportunity.id.clone(),
            timestamp: Utc::now(),
            trade_type: trade_type_for(opportunity),
            status: phase.status(),
            phase,
            error_message: Some(format!("transaction {} not confirmed before timeout", tx_ref)),
            tx_ref: Some(tx_ref),
            position_size: opportunity.position_size,
            expected_profit: opportunity.net_profit,
            profit: Decimal::ZERO,
            gas_used: 0,
            gas_cost: Decimal::ZERO,
            efficiency: Decimal::ZERO,
            settlement: SettlementStatus::NotAttempted,
            execution_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn failed_result(
        &self,
        opportunity: &ArbitrageOpportunity,
        phase: TradePhase,
        tx_ref: Option<String>,
        gas_used: u64,
        gas_cost: Decimal,
        error: String,
        started: Instant,
    ) -> ExecutionResult {
        let profit = if gas_used > 0 { -gas_cost } else { Decimal::ZERO };
        ExecutionResult {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id: opportunity.id.clone(),
            timestamp: Utc::now(),
            trade_type: trade_type_for(opportunity),
            status: phase.status(),
            phase,
            tx_ref,
            position_size: opportunity.position_size,
            expected_profit: opportunity.net_profit,
            profit,
            gas_used,
            gas_cost,
            efficiency: efficiency(profit, gas_cost),
            settlement: SettlementStatus::NotAttempted,
            execution_time_ms: started.elapsed().as_millis() as u64,
            error_message: Some(error),
        }
    }
}

/// Profit per unit of gas spent; zero when no gas was paid.
pub fn efficiency(profit: Decimal, gas_cost: Decimal) -> Decimal {
    if gas_cost.is_zero() {
        Decimal::ZERO
    } else {
        (profit / gas_cost).round_dp(4)
    }
}
