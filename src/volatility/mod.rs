//! Price volatility tracking

pub mod calculator;

pub use calculator::*;
