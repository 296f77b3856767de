//! Trade execution types

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::errors::{BotError, BotResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeType {
    BuyDexSellCex,
    BuyCexSellDex,
}

/// On-chain swap built for one approved opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapOrder {
    pub opportunity_id: String,
    pub trade_type: TradeType,
    pub token_in: Address,
    pub token_out: Address,
    pub path: Vec<Address>,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub recipient: Address,
    pub gas_limit: u64,
}

/// How a submitted transaction ended, as far as the chain has told us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Confirmed,
    Reverted,
    /// No receipt within the confirmation timeout. The transaction may
    /// still be mined.
    Unresolved,
}

/// What the chain reported for a submitted trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeReceipt {
    pub tx_ref: String,
    pub status: ReceiptStatus,
    pub gas_used: u64,
    pub gas_price_wei: u128,
    /// Output actually received, in `token_out` base units, when known.
    pub amount_out: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Pending)
    }
}

/// Per-attempt state machine: `Built → Submitted → {Confirmed | Failed}`.
/// A built order that fails validation goes straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradePhase {
    Built,
    Submitted,
    Confirmed,
    Failed,
}

impl TradePhase {
    pub fn advance(self, next: TradePhase) -> BotResult<TradePhase> {
        use TradePhase::*;
        match (self, next) {
            (Built, Submitted) | (Built, Failed) | (Submitted, Confirmed) | (Submitted, Failed) => {
                Ok(next)
            }
            (from, to) => Err(BotError::Execution {
                message: format!("invalid trade transition {:?} -> {:?}", from, to),
            }),
        }
    }

    pub fn status(self) -> ExecutionStatus {
        match self {
            TradePhase::Built | TradePhase::Submitted => ExecutionStatus::Pending,
            TradePhase::Confirmed => ExecutionStatus::Confirmed,
            TradePhase::Failed => ExecutionStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SettlementStatus {
    NotAttempted,
    Delivered { tx_ref: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub id: String,
    pub opportunity_id: String,
    pub timestamp: DateTime<Utc>,
    pub trade_type: TradeType,
    pub status: ExecutionStatus,
    pub phase: TradePhase,
    pub tx_ref: Option<String>,
    pub position_size: Decimal,
    pub expected_profit: Decimal,
    pub profit: Decimal,
    pub gas_used: u64,
    pub gas_cost: Decimal,
    pub efficiency: Decimal,
    pub settlement: SettlementStatus,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
}

impl ExecutionResult {
    /// Trade confirmed on-chain but the settlement did not go through.
    pub fn is_partial_failure(&self) -> bool {
        self.status == ExecutionStatus::Confirmed
            && matches!(self.settlement, SettlementStatus::Failed { .. })
    }

    /// Submitted but never resolved to confirmed or failed.
    pub fn is_unresolved(&self) -> bool {
        self.status == ExecutionStatus::Pending
    }
}
