//! Core data types and structures

pub mod addresses;
pub mod market;
pub mod arbitrage;
pub mod advisory;
pub mod risk;
pub mod settlement;
pub mod execution;
pub mod events;
pub mod cycle;

pub use addresses::*;
pub use market::*;
pub use arbitrage::*;
pub use advisory::*;
pub use risk::*;
pub use settlement::*;
pub use execution::*;
pub use events::*;
pub use cycle::*;
