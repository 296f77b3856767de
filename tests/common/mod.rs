//! Shared fakes and agent wiring for the integration suites
#![allow(dead_code)]

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use spread_settle_bot::{
    advisory::{AdvisoryGate, AdvisoryService},
    arbitrage::SpreadAnalyzer,
    events::EventBus,
    execution::{ChainSubmitter, ExecutionCoordinator, ExecutionSettings, SimulatedSubmitter},
    network::{GasEstimator, PoolQuoteSource, PriceSource},
    pipeline::{Agent, MarketSettings, MarketSources},
    risk::{PerformanceTracker, RiskValidator},
    settlement::SettlementSigner,
    types::*,
    utils::to_base_units,
    validation::MarketDataLimits,
    BotError, BotResult,
};

pub const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const SWAP_GAS_UNITS: u64 = 200_000;

pub struct FixedPrice(pub Option<Decimal>);

#[async_trait]
impl PriceSource for FixedPrice {
    async fn get_price(&self, symbol: &str) -> BotResult<PriceQuote> {
        match self.0 {
            Some(price) => Ok(PriceQuote {
                symbol: symbol.to_string(),
                price,
                timestamp: Utc::now(),
            }),
            None => Err(BotError::Network {
                message: "exchange unreachable".into(),
                source: None,
                retry_count: 3,
            }),
        }
    }
}

/// Quotes one whole base token at a fixed quote price.
pub struct FixedPool(pub Decimal);

#[async_trait]
impl PoolQuoteSource for FixedPool {
    async fn get_pool_quote(&self, _token_in: Address, _token_out: Address, _amount_in: U256) -> BotResult<U256> {
        to_base_units(self.0, USDC_DECIMALS)
    }
}

pub struct FixedGas(pub Decimal);

#[async_trait]
impl GasEstimator for FixedGas {
    async fn estimate_gas(&self, gas_units: u64) -> BotResult<GasEstimate> {
        Ok(GasEstimate {
            gas_price_wei: 1_000_000_000,
            gas_units,
            cost_in_quote: self.0,
        })
    }
}

pub struct Advisor {
    pub should_execute: bool,
    pub confidence: u8,
}

#[async_trait]
impl AdvisoryService for Advisor {
    async fn advise(&self, _request: &AdvisoryRequest) -> BotResult<AdvisoryResponse> {
        Ok(AdvisoryResponse {
            should_execute: self.should_execute,
            confidence: self.confidence,
            reasoning: "volatility elevated".into(),
            risk_note: String::new(),
        })
    }
}

pub fn limits() -> RiskLimits {
    RiskLimits {
        max_position_size: dec!(5000),
        max_daily_loss_pct: dec!(5),
        exposure_ceiling_multiplier: dec!(3),
    }
}

pub struct Harness {
    pub cex: Option<Decimal>,
    pub dex: Decimal,
    pub gas: Decimal,
    pub advisor: Option<Arc<dyn AdvisoryService>>,
    pub submitter: Arc<SimulatedSubmitter>,
}

impl Harness {
    /// CEX 3030 over DEX 3000 with 2 of gas: a 1% spread worth 8 net on 1000.
    pub fn profitable() -> Self {
        Self {
            cex: Some(dec!(3030)),
            dex: dec!(3000),
            gas: dec!(2),
            advisor: None,
            submitter: Arc::new(SimulatedSubmitter::new()),
        }
    }

    pub fn build(&self, events: EventBus) -> Agent {
        self.build_with_price(Arc::new(FixedPrice(self.cex)), events)
    }

    pub fn build_with_price(&self, price: Arc<dyn PriceSource>, events: EventBus) -> Agent {
        let sources = MarketSources {
            price,
            pool: Arc::new(FixedPool(self.dex)),
            gas: Arc::new(FixedGas(self.gas)),
        };
        let settings = MarketSettings {
            cex_symbol: "ETHUSDC".into(),
            base_token: WETH_BASE,
            quote_token: USDC_BASE,
            base_decimals: WETH_DECIMALS,
            quote_decimals: USDC_DECIMALS,
            position_size: dec!(1000),
            swap_gas_units: SWAP_GAS_UNITS,
            limits: MarketDataLimits::default(),
        };
        let execution = ExecutionSettings {
            base_token: WETH_BASE,
            quote_token: USDC_BASE,
            base_decimals: WETH_DECIMALS,
            quote_decimals: USDC_DECIMALS,
            recipient: Address::repeat_byte(0x42),
            slippage_bps: 50,
            trade_gas_limit: 500_000,
            estimated_gas_units: SWAP_GAS_UNITS,
        };
        let signer = SettlementSigner::from_private_key(TEST_KEY).unwrap();
        let submitter: Arc<dyn ChainSubmitter> = self.submitter.clone();

        Agent::new(
            sources,
            settings,
            SpreadAnalyzer::new(ConfidenceBuckets::default(), 80, MarketDataLimits::default()),
            AdvisoryGate::new(self.advisor.clone(), 70, Duration::from_millis(200), AdvisoryFallback::Reject),
            RiskValidator::new(limits()),
            ExecutionCoordinator::new(submitter, signer, execution, events.clone()),
            PerformanceTracker::new(limits()),
            events,
        )
    }
}

pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<EventEnvelope>) -> Vec<EventEnvelope> {
    let mut out = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        out.push(envelope);
    }
    out
}
