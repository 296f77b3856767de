//! Dry-run submitter

use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use super::ChainSubmitter;
use crate::errors::{BotError, BotResult};
use crate::types::{ReceiptStatus, SettlementPayload, SwapOrder, TradeReceipt};

pub const SIMULATED_GAS_USED: u64 = 156_000;
pub const SIMULATED_GAS_PRICE_WEI: u128 = 120_000_000; // 0.12 gwei

/// Deterministic stand-in for the chain. Used when trade execution is
/// disabled and by tests; records everything it was asked to submit.
pub struct SimulatedSubmitter {
    latency: Duration,
    gas_used: u64,
    amount_out: Option<U256>,
    fail_trades: bool,
    revert_trades: bool,
    timeout_trades: bool,
    fail_settlements: bool,
    counter: AtomicU64,
    trades: Mutex<Vec<SwapOrder>>,
    settlements: Mutex<Vec<SettlementPayload>>,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            gas_used: SIMULATED_GAS_USED,
            amount_out: None,
            fail_trades: false,
            revert_trades: false,
            timeout_trades: false,
            fail_settlements: false,
            counter: AtomicU64::new(0),
            trades: Mutex::new(Vec::new()),
            settlements: Mutex::new(Vec::new()),
        }
    }
}

impl SimulatedSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_gas_used(mut self, gas_used: u64) -> Self {
        self.gas_used = gas_used;
        self
    }

    /// Reports this output on confirmed receipts, as if decoded from the
    /// swap's transfer logs.
    pub fn with_amount_out(mut self, amount_out: U256) -> Self {
        self.amount_out = Some(amount_out);
        self
    }

    /// Submission itself errors (e.g. RPC rejects the transaction).
    pub fn failing_trades(mut self) -> Self {
        self.fail_trades = true;
        self
    }

    /// Transaction is mined but reverts, consuming gas.
    pub fn reverting_trades(mut self) -> Self {
        self.revert_trades = true;
        self
    }

    /// Transaction is sent but no receipt arrives before the timeout.
    pub fn timing_out_trades(mut self) -> Self {
        self.timeout_trades = true;
        self
    }

    pub fn failing_settlements(mut self) -> Self {
        self.fail_settlements = true;
        self
    }

    pub async fn submitted_trades(&self) -> Vec<SwapOrder> {
        self.trades.lock().await.clone()
    }

    pub async fn submitted_settlements(&self) -> Vec<SettlementPayload> {
        self.settlements.lock().await.clone()
    }

    fn next_ref(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("sim-0x{:064x}", n)
    }
}

#[async_trait]
impl ChainSubmitter for SimulatedSubmitter {
    async fn submit_trade(&self, order: &SwapOrder) -> BotResult<TradeReceipt> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.trades.lock().await.push(order.clone());

        if self.fail_trades {
            return Err(BotError::Execution {
                message: "simulated submission failure".to_string(),
            });
        }

        let tx_ref = self.next_ref();
        let receipt = if self.timeout_trades {
            TradeReceipt {
                tx_ref,
                status: ReceiptStatus::Unresolved,
                gas_used: 0,
                gas_price_wei: 0,
                amount_out: None,
            }
        } else {
            let status = if self.revert_trades {
                ReceiptStatus::Reverted
            } else {
                ReceiptStatus::Confirmed
            };
            TradeReceipt {
                tx_ref,
                status,
                gas_used: self.gas_used,
                gas_price_wei: SIMULATED_GAS_PRICE_WEI,
                amount_out: self.amount_out.filter(|_| status == ReceiptStatus::Confirmed),
            }
        };
        info!("🎭 Simulated swap {}: {:?}", receipt.tx_ref, receipt.status);
        Ok(receipt)
    }

    async fn submit_settlement(&self, payload: &SettlementPayload) -> BotResult<String> {
        self.settlements.lock().await.push(payload.clone());
        if self.fail_settlements {
            return Err(BotError::Settlement {
                message: "simulated settlement revert".to_string(),
            });
        }
        Ok(self.next_ref())
    }
}
