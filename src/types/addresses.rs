//! Well-known token addresses used as configuration defaults

use alloy::primitives::{Address, address};

// Base mainnet
pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
pub const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

pub const WETH_DECIMALS: u8 = 18;
pub const USDC_DECIMALS: u8 = 6;

/// Returns true for the all-zero address, which is never a valid token,
/// router or recipient.
pub fn is_unset(address: &Address) -> bool {
    *address == Address::ZERO
}
