//! Capability traits for market data sources

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use crate::errors::BotResult;
use crate::types::{GasEstimate, PriceQuote};

/// Centralized exchange (or any off-chain) price feed.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, symbol: &str) -> BotResult<PriceQuote>;
}

/// On-chain pool quoting `amount_in` of `token_in` into `token_out`.
#[async_trait]
pub trait PoolQuoteSource: Send + Sync {
    async fn get_pool_quote(&self, token_in: Address, token_out: Address, amount_in: U256) -> BotResult<U256>;
}

#[async_trait]
pub trait GasEstimator: Send + Sync {
    /// Cost of an operation consuming `gas_units`, priced in the quote token.
    async fn estimate_gas(&self, gas_units: u64) -> BotResult<GasEstimate>;
}
