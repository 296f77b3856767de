//! Spread analysis between the CEX quote and the DEX pool

pub mod calculator;

pub use calculator::*;
