//! Market data sanity checks

pub mod price;

pub use price::*;
