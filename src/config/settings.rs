//! Bot configuration settings and environment variable handling

use alloy::primitives::Address;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use crate::errors::{BotError, BotResult};
use crate::types::{
    AdvisoryFallback, ConfidenceBuckets, RiskLimits, USDC_BASE, USDC_DECIMALS, WETH_BASE,
    WETH_DECIMALS,
};

// Position and risk constants
pub const MIN_POSITION_SIZE: Decimal = dec!(1);
pub const MAX_POSITION_SIZE_CAP: Decimal = dec!(1000000);
pub const DEFAULT_POSITION_SIZE: Decimal = dec!(1000);
pub const DEFAULT_MAX_POSITION_SIZE: Decimal = dec!(5000);
pub const DEFAULT_MAX_DAILY_LOSS_PCT: Decimal = dec!(5);
pub const DEFAULT_EXPOSURE_MULTIPLIER: Decimal = dec!(3);
pub const MAX_SLIPPAGE_BPS: u32 = 500; // 5%

// Market data sanity
pub const MIN_VALID_PRICE: Decimal = dec!(0.0001);
pub const PRICE_STALENESS_SECONDS: u64 = 60;
pub const MAX_PRICE_DEVIATION_PCT: Decimal = dec!(10); // 10% max difference between DEX/CEX

// Decision thresholds
pub const HIGH_CONFIDENCE_THRESHOLD: u8 = 80;
pub const ADVISORY_CONFIDENCE_FLOOR: u8 = 70;

// Trade execution constants
pub const DEFAULT_SWAP_GAS_UNITS: u64 = 200_000;
pub const TRADE_GAS_LIMIT: u64 = 500_000;
pub const SETTLEMENT_GAS_LIMIT: u64 = 300_000;
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 60;
pub const ADVISORY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;
/// Largest token precision `Decimal` can scale to base units.
pub const MAX_TOKEN_DECIMALS: u8 = 28;

#[derive(Debug, Clone)]
pub struct Config {
    // Chain access
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub recipient: Address,
    pub base_token: Address,
    pub quote_token: Address,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    /// Contract that receives signed settlements.
    pub settlement_router: Address,
    /// UniswapV2-style router used for swaps and `getAmountsOut` quotes.
    pub dex_router: Address,
    // Price feeds
    pub cex_price_url: String,
    pub cex_symbol: String,
    pub native_symbol: String,
    // Trade sizing and execution
    pub position_size: Decimal,
    pub slippage_bps: u32,
    pub swap_gas_units: u64,
    pub trade_gas_limit: u64,
    pub settlement_gas_limit: u64,
    pub enable_trade_execution: bool,
    // Risk limits
    pub max_position_size: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub exposure_ceiling_multiplier: Decimal,
    // Market data sanity
    pub min_valid_price: Decimal,
    pub max_price_deviation_pct: Decimal,
    pub price_staleness_secs: u64,
    // Opportunity scoring
    pub confidence_buckets: ConfidenceBuckets,
    pub high_confidence_threshold: u8,
    // Advisory gate
    pub advisory_url: Option<String>,
    pub advisory_api_key: Option<String>,
    pub advisory_confidence_floor: u8,
    pub advisory_timeout_secs: u64,
    pub advisory_fallback: AdvisoryFallback,
    // Scheduling
    pub scan_interval_secs: u64,
    pub confirmation_timeout_secs: u64,
    /// Problems found while parsing; reported by `validate`.
    parse_errors: Vec<String>,
}

impl Config {
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unparseable values fall
    /// back to their defaults and are reported by [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut parse_errors = Vec::new();

        let mut address = |key: &str, default: Address| -> Address {
            match lookup(key) {
                Some(raw) => Address::from_str(raw.trim()).unwrap_or_else(|_| {
                    parse_errors.push(format!("{} is not a valid address: {}", key, raw));
                    Address::ZERO
                }),
                None => default,
            }
        };
        let recipient = address("RECIPIENT_ADDRESS", Address::ZERO);
        let base_token = address("BASE_TOKEN_ADDRESS", WETH_BASE);
        let quote_token = address("QUOTE_TOKEN_ADDRESS", USDC_BASE);
        let settlement_router = address("ROUTER_ADDRESS", Address::ZERO);
        let dex_router = address("DEX_ROUTER_ADDRESS", Address::ZERO);

        let confidence_buckets = match lookup("CONFIDENCE_BUCKETS") {
            Some(raw) => ConfidenceBuckets::parse(&raw).unwrap_or_else(|e| {
                parse_errors.push(format!("CONFIDENCE_BUCKETS: {}", e));
                ConfidenceBuckets::default()
            }),
            None => ConfidenceBuckets::default(),
        };

        let advisory_fallback = match lookup("ADVISORY_FALLBACK") {
            Some(raw) => AdvisoryFallback::from_str(&raw).unwrap_or_else(|e| {
                parse_errors.push(format!("ADVISORY_FALLBACK: {}", e));
                AdvisoryFallback::default()
            }),
            None => AdvisoryFallback::default(),
        };

        let decimal = |key: &str| lookup(key).and_then(|s| Decimal::from_str(s.trim()).ok());
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let mut token_decimals = |key: &str, default: u8| -> u8 {
            match number(key) {
                Some(d) if d <= MAX_TOKEN_DECIMALS as u64 => d as u8,
                Some(d) => {
                    parse_errors.push(format!("{} {} exceeds the supported maximum {}", key, d, MAX_TOKEN_DECIMALS));
                    default
                }
                None => default,
            }
        };
        let base_decimals = token_decimals("BASE_TOKEN_DECIMALS", WETH_DECIMALS);
        let quote_decimals = token_decimals("QUOTE_TOKEN_DECIMALS", USDC_DECIMALS);

        let max_position_size = decimal("MAX_POSITION_SIZE")
            .unwrap_or(DEFAULT_MAX_POSITION_SIZE)
            .max(MIN_POSITION_SIZE)
            .min(MAX_POSITION_SIZE_CAP);

        Self {
            rpc_url: lookup("RPC_URL").unwrap_or_else(|| "https://mainnet.base.org".to_string()),
            private_key: non_empty("PRIVATE_KEY"),
            recipient,
            base_token,
            quote_token,
            base_decimals,
            quote_decimals,
            settlement_router,
            dex_router,
            cex_price_url: lookup("CEX_PRICE_URL")
                .unwrap_or_else(|| "https://api.binance.com/api/v3/ticker/price".to_string()),
            cex_symbol: lookup("CEX_SYMBOL").unwrap_or_else(|| "ETHUSDC".to_string()),
            native_symbol: lookup("NATIVE_SYMBOL").unwrap_or_else(|| "ETHUSDC".to_string()),
            position_size: decimal("POSITION_SIZE")
                .unwrap_or(DEFAULT_POSITION_SIZE)
                .max(MIN_POSITION_SIZE)
                .min(MAX_POSITION_SIZE_CAP),
            slippage_bps: number("SLIPPAGE_BPS")
                .map(|b| b as u32)
                .unwrap_or(50) // 0.5% default
                .min(MAX_SLIPPAGE_BPS),
            swap_gas_units: number("SWAP_GAS_UNITS").unwrap_or(DEFAULT_SWAP_GAS_UNITS),
            trade_gas_limit: number("TRADE_GAS_LIMIT").unwrap_or(TRADE_GAS_LIMIT),
            settlement_gas_limit: number("SETTLEMENT_GAS_LIMIT").unwrap_or(SETTLEMENT_GAS_LIMIT),
            enable_trade_execution: flag("ENABLE_TRADE_EXECUTION", false),
            max_position_size,
            max_daily_loss_pct: decimal("MAX_DAILY_LOSS_PCT")
                .unwrap_or(DEFAULT_MAX_DAILY_LOSS_PCT)
                .max(Decimal::ZERO)
                .min(dec!(100)),
            exposure_ceiling_multiplier: decimal("EXPOSURE_CEILING_MULTIPLIER")
                .unwrap_or(DEFAULT_EXPOSURE_MULTIPLIER),
            min_valid_price: decimal("MIN_VALID_PRICE").unwrap_or(MIN_VALID_PRICE),
            max_price_deviation_pct: decimal("MAX_PRICE_DEVIATION_PCT")
                .unwrap_or(MAX_PRICE_DEVIATION_PCT),
            price_staleness_secs: number("PRICE_STALENESS_SECS").unwrap_or(PRICE_STALENESS_SECONDS),
            confidence_buckets,
            high_confidence_threshold: number("HIGH_CONFIDENCE_THRESHOLD")
                .map(|c| c.min(100) as u8)
                .unwrap_or(HIGH_CONFIDENCE_THRESHOLD),
            advisory_url: non_empty("ADVISORY_URL"),
            advisory_api_key: non_empty("ADVISORY_API_KEY"),
            advisory_confidence_floor: number("ADVISORY_CONFIDENCE_FLOOR")
                .map(|c| c.min(100) as u8)
                .unwrap_or(ADVISORY_CONFIDENCE_FLOOR),
            advisory_timeout_secs: number("ADVISORY_TIMEOUT_SECS").unwrap_or(ADVISORY_TIMEOUT_SECS),
            advisory_fallback,
            scan_interval_secs: number("SCAN_INTERVAL_SECS").unwrap_or(DEFAULT_SCAN_INTERVAL_SECS),
            confirmation_timeout_secs: number("CONFIRMATION_TIMEOUT_SECS")
                .unwrap_or(CONFIRMATION_TIMEOUT_SECS),
            parse_errors,
        }
    }

    /// Checks the whole configuration and reports every problem at once.
    pub fn validate(&self) -> BotResult<()> {
        let mut problems = self.parse_errors.clone();

        if self.position_size > self.max_position_size {
            problems.push(format!(
                "POSITION_SIZE {} exceeds MAX_POSITION_SIZE {}",
                self.position_size, self.max_position_size
            ));
        }
        if self.exposure_ceiling_multiplier < Decimal::ONE {
            problems.push("EXPOSURE_CEILING_MULTIPLIER must be at least 1".to_string());
        }
        if self.max_daily_loss_pct <= Decimal::ZERO {
            problems.push("MAX_DAILY_LOSS_PCT must be positive".to_string());
        }
        if self.min_valid_price <= Decimal::ZERO {
            problems.push("MIN_VALID_PRICE must be positive".to_string());
        }
        if self.max_price_deviation_pct <= Decimal::ZERO {
            problems.push("MAX_PRICE_DEVIATION_PCT must be positive".to_string());
        }
        if self.base_token == self.quote_token {
            problems.push("base and quote token must differ".to_string());
        }
        for (name, secs) in [
            ("SCAN_INTERVAL_SECS", self.scan_interval_secs),
            ("ADVISORY_TIMEOUT_SECS", self.advisory_timeout_secs),
            ("CONFIRMATION_TIMEOUT_SECS", self.confirmation_timeout_secs),
        ] {
            if secs == 0 {
                problems.push(format!("{} must be greater than zero", name));
            }
        }
        if self.trade_gas_limit == 0 || self.settlement_gas_limit == 0 {
            problems.push("gas limits must be greater than zero".to_string());
        }

        if self.private_key.is_none() {
            problems.push("PRIVATE_KEY is required to sign settlements".to_string());
        }
        // Pool quotes and order validation need these in dry-run mode too.
        for (name, addr) in [
            ("RECIPIENT_ADDRESS", self.recipient),
            ("DEX_ROUTER_ADDRESS", self.dex_router),
        ] {
            if addr == Address::ZERO {
                problems.push(format!("{} is required", name));
            }
        }
        if self.enable_trade_execution && self.settlement_router == Address::ZERO {
            problems.push("ROUTER_ADDRESS is required when trade execution is enabled".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BotError::config(problems.join("; ")))
        }
    }

    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            max_position_size: self.max_position_size,
            max_daily_loss_pct: self.max_daily_loss_pct,
            exposure_ceiling_multiplier: self.exposure_ceiling_multiplier,
        }
    }

    pub fn advisory_enabled(&self) -> bool {
        self.advisory_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| values.get(key).cloned())
    }

    const RECIPIENT: &str = "0x1111111111111111111111111111111111111111";
    const DEX_ROUTER: &str = "0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24";

    /// Minimal configuration that passes validation in dry-run mode.
    fn dry_run_with(extra: &[(&str, &str)]) -> Config {
        let mut pairs = vec![
            ("PRIVATE_KEY", TEST_KEY),
            ("RECIPIENT_ADDRESS", RECIPIENT),
            ("DEX_ROUTER_ADDRESS", DEX_ROUTER),
        ];
        pairs.extend_from_slice(extra);
        config_from(&pairs)
    }

    #[test]
    fn defaults_are_documented_values() {
        let config = dry_run_with(&[]);
        assert_eq!(config.position_size, dec!(1000));
        assert_eq!(config.max_position_size, dec!(5000));
        assert_eq!(config.exposure_ceiling_multiplier, dec!(3));
        assert_eq!(config.advisory_confidence_floor, 70);
        assert_eq!(config.high_confidence_threshold, 80);
        assert_eq!(config.advisory_fallback, AdvisoryFallback::Reject);
        assert_eq!(config.scan_interval_secs, 30);
        assert!(!config.enable_trade_execution);
        assert!(!config.advisory_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn values_are_clamped_to_bounds() {
        let config = config_from(&[
            ("PRIVATE_KEY", TEST_KEY),
            ("SLIPPAGE_BPS", "9000"),
            ("ADVISORY_CONFIDENCE_FLOOR", "250"),
            ("MAX_DAILY_LOSS_PCT", "400"),
        ]);
        assert_eq!(config.slippage_bps, MAX_SLIPPAGE_BPS);
        assert_eq!(config.advisory_confidence_floor, 100);
        assert_eq!(config.max_daily_loss_pct, dec!(100));
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = config_from(&[
            ("ENABLE_TRADE_EXECUTION", "true"),
            ("RECIPIENT_ADDRESS", "not-an-address"),
            ("SCAN_INTERVAL_SECS", "0"),
            ("ADVISORY_FALLBACK", "maybe"),
        ]);
        let message = match config.validate() {
            Err(BotError::Config { message }) => message,
            other => panic!("expected config error, got {:?}", other),
        };
        assert!(message.contains("RECIPIENT_ADDRESS is not a valid address"));
        assert!(message.contains("SCAN_INTERVAL_SECS"));
        assert!(message.contains("ADVISORY_FALLBACK"));
        assert!(message.contains("PRIVATE_KEY"));
        assert!(message.contains("DEX_ROUTER_ADDRESS"));
        assert!(message.contains("ROUTER_ADDRESS is required when trade execution is enabled"));
    }

    #[test]
    fn dry_run_still_requires_recipient_and_dex_router() {
        let config = config_from(&[("PRIVATE_KEY", TEST_KEY)]);
        let message = match config.validate() {
            Err(BotError::Config { message }) => message,
            other => panic!("expected config error, got {:?}", other),
        };
        assert!(message.contains("RECIPIENT_ADDRESS is required"));
        assert!(message.contains("DEX_ROUTER_ADDRESS is required"));
        assert!(!message.contains("ROUTER_ADDRESS is required when"));

        assert!(dry_run_with(&[]).validate().is_ok());
    }

    #[test]
    fn token_decimals_beyond_decimal_range_are_rejected() {
        let config = dry_run_with(&[("BASE_TOKEN_DECIMALS", "30"), ("QUOTE_TOKEN_DECIMALS", "28")]);
        assert_eq!(config.base_decimals, WETH_DECIMALS);
        assert_eq!(config.quote_decimals, 28);
        let message = match config.validate() {
            Err(BotError::Config { message }) => message,
            other => panic!("expected config error, got {:?}", other),
        };
        assert!(message.contains("BASE_TOKEN_DECIMALS 30"));
        assert!(!message.contains("QUOTE_TOKEN_DECIMALS"));
    }

    #[test]
    fn risk_limits_follow_configuration() {
        let config = config_from(&[
            ("PRIVATE_KEY", TEST_KEY),
            ("EXPOSURE_CEILING_MULTIPLIER", "1.2"),
        ]);
        let limits = config.risk_limits();
        assert_eq!(limits.exposure_ceiling(), dec!(6000));
        assert_eq!(limits.daily_loss_limit(), dec!(250));
    }
}
