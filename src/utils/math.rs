//! Mathematical utility functions

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::errors::{BotError, BotResult};

/// `10^n` for token precisions. Fails past `Decimal`'s 28-digit range
/// instead of panicking.
pub fn pow10(n: u8) -> BotResult<Decimal> {
    match n {
        0 => Ok(dec!(1)),
        6 => Ok(dec!(1_000_000)),
        18 => Ok(dec!(1_000_000_000_000_000_000)),
        _ => {
            let mut result = dec!(1);
            for _ in 0..n {
                result = result.checked_mul(dec!(10)).ok_or_else(|| {
                    BotError::config(format!("10^{} exceeds decimal range", n))
                })?;
            }
            Ok(result)
        }
    }
}

/// Converts a token amount into integer base units, truncating any
/// precision below one unit.
pub fn to_base_units(amount: Decimal, decimals: u8) -> BotResult<U256> {
    if amount.is_sign_negative() {
        return Err(BotError::Execution {
            message: format!("negative token amount {}", amount),
        });
    }
    let scaled = amount
        .checked_mul(pow10(decimals)?)
        .ok_or_else(|| BotError::Execution {
            message: format!("amount {} overflows at {} decimals", amount, decimals),
        })?
        .trunc();
    U256::from_str(&scaled.normalize().to_string())
        .map_err(|e| BotError::parsing(format!("base units for {}", amount), e))
}

/// Converts integer base units back into a token amount.
pub fn from_base_units(value: U256, decimals: u8) -> BotResult<Decimal> {
    let raw = Decimal::from_str(&value.to_string())
        .map_err(|e| BotError::parsing(format!("token amount {} out of range", value), e))?;
    Ok(raw / pow10(decimals)?)
}

/// Percentage of `part` in `whole`; zero when `whole` is zero.
pub fn pct_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * dec!(100)
    }
}
