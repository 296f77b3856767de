//! Risk gating and the persistent risk ledger

pub mod validator;
pub mod circuit_breaker;
pub mod tracker;

pub use validator::*;
pub use circuit_breaker::*;
pub use tracker::*;
