//! Spread Settle Bot - CEX/DEX arbitrage agent with risk gating and signed settlement
//!
//! Each cycle compares a centralized exchange price with a DEX pool quote,
//! scores the spread, optionally consults an advisory service, validates the
//! trade against a persistent risk ledger, and executes a swap followed by an
//! EIP-191 signed settlement.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod arbitrage;
pub mod validation;
pub mod volatility;
pub mod advisory;
pub mod risk;
pub mod settlement;
pub mod execution;
pub mod events;
pub mod pipeline;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{BotError, BotResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
