//! On-chain pool quotes and gas pricing

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol,
    sol_types::SolCall,
};
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::prelude::*;
use std::sync::Arc;
use tracing::debug;
use crate::{
    errors::{BotError, BotResult},
    network::{retry_with_backoff, GasEstimator, PoolQuoteSource, PriceSource, RetryConfig},
    types::GasEstimate,
    utils::{from_base_units, pow10, to_base_units},
    ConcreteProvider,
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IUniswapV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
    }
}

/// Quotes through a UniswapV2-style router's `getAmountsOut`.
pub struct RouterQuoteSource {
    provider: Arc<ConcreteProvider>,
    router: Address,
}

impl RouterQuoteSource {
    pub fn new(provider: Arc<ConcreteProvider>, router: Address) -> Self {
        Self { provider, router }
    }
}

#[async_trait]
impl PoolQuoteSource for RouterQuoteSource {
    async fn get_pool_quote(&self, token_in: Address, token_out: Address, amount_in: U256) -> BotResult<U256> {
        let data = IUniswapV2Router::getAmountsOutCall {
            amountIn: amount_in,
            path: vec![token_in, token_out],
        }
        .abi_encode();

        let operation = || async {
            let tx = TransactionRequest::default()
                .to(self.router)
                .input(data.clone().into());
            let result = self.provider.call(&tx).await
                .context("Failed to call getAmountsOut")?;
            let decoded = IUniswapV2Router::getAmountsOutCall::abi_decode_returns(&result, true)
                .context("Failed to decode getAmountsOut")?;
            decoded
                .amounts
                .last()
                .copied()
                .ok_or_else(|| anyhow::anyhow!("getAmountsOut returned no amounts"))
        };

        retry_with_backoff(operation, &RetryConfig::default(), "pool quote").await
    }
}

/// Price of one whole base token in quote tokens, read from the pool.
pub async fn pool_price(
    source: &dyn PoolQuoteSource,
    base: Address,
    quote: Address,
    base_decimals: u8,
    quote_decimals: u8,
) -> BotResult<Decimal> {
    let one_base = to_base_units(Decimal::ONE, base_decimals)?;
    let out = source.get_pool_quote(base, quote, one_base).await?;
    let price = from_base_units(out, quote_decimals)?;
    debug!(%price, "DEX pool price");
    Ok(price)
}

/// Prices gas from the node's gas price and a native/quote price feed.
pub struct ProviderGasEstimator {
    provider: Arc<ConcreteProvider>,
    native_price: Arc<dyn PriceSource>,
    native_symbol: String,
}

impl ProviderGasEstimator {
    pub fn new(provider: Arc<ConcreteProvider>, native_price: Arc<dyn PriceSource>, native_symbol: impl Into<String>) -> Self {
        Self {
            provider,
            native_price,
            native_symbol: native_symbol.into(),
        }
    }
}

/// Cost in quote tokens of `gas_units` at `gas_price_wei`, given the native
/// token's quote price.
pub fn gas_cost_in_quote(gas_units: u64, gas_price_wei: u128, native_price: Decimal) -> BotResult<Decimal> {
    let wei = Decimal::from_u128(gas_price_wei)
        .and_then(|p| p.checked_mul(Decimal::from(gas_units)))
        .ok_or_else(|| BotError::invalid_data("gas", Decimal::ZERO, format!("gas price {} out of range", gas_price_wei)))?;
    Ok(wei / pow10(18)? * native_price)
}

#[async_trait]
impl GasEstimator for ProviderGasEstimator {
    async fn estimate_gas(&self, gas_units: u64) -> BotResult<GasEstimate> {
        let gas_price_wei = retry_with_backoff(
            || async { self.provider.get_gas_price().await.context("Failed to get gas price") },
            &RetryConfig::default(),
            "gas price",
        )
        .await?;
        let native = self.native_price.get_price(&self.native_symbol).await?;
        let cost_in_quote = gas_cost_in_quote(gas_units, gas_price_wei, native.price)?;

        Ok(GasEstimate {
            gas_price_wei,
            gas_units,
            cost_in_quote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct FixedPool(U256);

    #[async_trait]
    impl PoolQuoteSource for FixedPool {
        async fn get_pool_quote(&self, _: Address, _: Address, _: U256) -> BotResult<U256> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn pool_price_scales_by_decimals() {
        // 1 WETH -> 3012.5 USDC
        let pool = FixedPool(U256::from(3_012_500_000u64));
        let price = pool_price(&pool, Address::repeat_byte(1), Address::repeat_byte(2), 18, 6)
            .await
            .unwrap();
        assert_eq!(price, dec!(3012.5));
    }

    #[test]
    fn gas_cost_uses_native_price() {
        // 200k gas at 1 gwei = 0.0002 ETH; at 3000 USDC/ETH = 0.6 USDC
        let cost = gas_cost_in_quote(200_000, 1_000_000_000, dec!(3000)).unwrap();
        assert_eq!(cost, dec!(0.6));
    }

    #[test]
    fn swap_call_encodes_selector() {
        let call = IUniswapV2Router::getAmountsOutCall {
            amountIn: U256::from(1u64),
            path: vec![Address::ZERO, Address::repeat_byte(1)],
        };
        let encoded = call.abi_encode();
        assert_eq!(&encoded[..4], &IUniswapV2Router::getAmountsOutCall::SELECTOR);
    }
}
