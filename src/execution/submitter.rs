//! On-chain submission of trades and settlements

use alloy::{
    primitives::{Address, Log, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol,
    sol_types::{SolCall, SolEvent},
};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use crate::{
    config::Config,
    errors::{BotError, BotResult},
    network::IUniswapV2Router,
    types::{ReceiptStatus, SettlementPayload, SwapOrder, TradeReceipt},
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ISettlementRouter {
        function executeSettlementWithSig(address token, uint256 amount, address recipient, bytes32 nonce, bytes calldata signature) external returns (bool);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

/// Sums the `token` transfers to `recipient` found in a receipt's logs.
/// `None` when there are none or the sum overflows.
pub fn amount_received<'a>(logs: impl IntoIterator<Item = &'a Log>, token: Address, recipient: Address) -> Option<U256> {
    let mut total: Option<U256> = None;
    for log in logs {
        if log.address != token {
            continue;
        }
        let Ok(transfer) = IERC20::Transfer::decode_log(log, true) else {
            continue;
        };
        if transfer.data.to != recipient {
            continue;
        }
        total = Some(total.unwrap_or(U256::ZERO).checked_add(transfer.data.value)?);
    }
    total
}

const SWAP_DEADLINE_SECS: u64 = 1200;

/// Submits exactly what it is given, once. Implementations never retry.
#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    async fn submit_trade(&self, order: &SwapOrder) -> BotResult<TradeReceipt>;

    /// Returns the settlement transaction reference once it is mined
    /// successfully.
    async fn submit_settlement(&self, payload: &SettlementPayload) -> BotResult<String>;
}

pub struct AlloyChainSubmitter {
    provider: Arc<dyn Provider>,
    dex_router: Address,
    settlement_router: Address,
    settlement_gas_limit: u64,
    confirmation_timeout: Duration,
}

impl AlloyChainSubmitter {
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            provider,
            dex_router: config.dex_router,
            settlement_router: config.settlement_router,
            settlement_gas_limit: config.settlement_gas_limit,
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }

    pub fn encode_swap(order: &SwapOrder, deadline: u64) -> Vec<u8> {
        IUniswapV2Router::swapExactTokensForTokensCall {
            amountIn: order.amount_in,
            amountOutMin: order.min_amount_out,
            path: order.path.clone(),
            to: order.recipient,
            deadline: U256::from(deadline),
        }
        .abi_encode()
    }

    pub fn encode_settlement(payload: &SettlementPayload) -> Vec<u8> {
        ISettlementRouter::executeSettlementWithSigCall {
            token: payload.token,
            amount: payload.amount,
            recipient: payload.recipient,
            nonce: payload.nonce,
            signature: payload.signature.clone(),
        }
        .abi_encode()
    }
}

#[async_trait]
impl ChainSubmitter for AlloyChainSubmitter {
    async fn submit_trade(&self, order: &SwapOrder) -> BotResult<TradeReceipt> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| BotError::Execution { message: e.to_string() })?
            .as_secs();
        let tx = TransactionRequest::default()
            .to(self.dex_router)
            .input(Self::encode_swap(order, now + SWAP_DEADLINE_SECS).into())
            .gas_limit(order.gas_limit);

        info!("📤 Sending swap to router {:?}", self.dex_router);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("Failed to send transaction")
            .map_err(|e| BotError::Execution { message: format!("{:#}", e) })?;
        let tx_ref = format!("{:?}", pending.tx_hash());
        info!("📡 Transaction sent: {}", tx_ref);

        tokio::select! {
            result = pending.get_receipt() => {
                let receipt = result.map_err(|e| BotError::Execution {
                    message: format!("receipt for {} unavailable: {}", tx_ref, e),
                })?;
                let (status, amount_out) = if receipt.status() {
                    let logs = receipt.inner.logs().iter().map(|log| &log.inner);
                    (ReceiptStatus::Confirmed, amount_received(logs, order.token_out, order.recipient))
                } else {
                    (ReceiptStatus::Reverted, None)
                };
                Ok(TradeReceipt {
                    tx_ref,
                    status,
                    gas_used: receipt.gas_used as u64,
                    gas_price_wei: receipt.effective_gas_price,
                    amount_out,
                })
            }
            _ = tokio::time::sleep(self.confirmation_timeout) => {
                warn!("⏰ Transaction {} not confirmed after {:?}", tx_ref, self.confirmation_timeout);
                Ok(TradeReceipt {
                    tx_ref,
                    status: ReceiptStatus::Unresolved,
                    gas_used: 0,
                    gas_price_wei: 0,
                    amount_out: None,
                })
            }
        }
    }

    async fn submit_settlement(&self, payload: &SettlementPayload) -> BotResult<String> {
        let tx = TransactionRequest::default()
            .to(self.settlement_router)
            .input(Self::encode_settlement(payload).into())
            .gas_limit(self.settlement_gas_limit);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| BotError::Settlement { message: e.to_string() })?;
        let tx_ref = format!("{:?}", pending.tx_hash());

        let receipt = tokio::time::timeout(self.confirmation_timeout, pending.get_receipt())
            .await
            .map_err(|_| BotError::Settlement {
                message: format!("settlement {} not confirmed in time", tx_ref),
            })?
            .map_err(|e| BotError::Settlement { message: e.to_string() })?;

        if !receipt.status() {
            return Err(BotError::Settlement {
                message: format!("settlement {} reverted", tx_ref),
            });
        }
        info!("✅ Settlement confirmed: {}", tx_ref);
        Ok(tx_ref)
    }
}
