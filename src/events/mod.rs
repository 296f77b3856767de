//! Event stream for dashboards and journals

pub mod clock;
pub mod bus;

pub use clock::*;
pub use bus::*;
