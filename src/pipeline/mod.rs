//! Decision cycle, scheduling and session statistics

pub mod agent;
pub mod scheduler;
pub mod stats;

pub use agent::*;
pub use scheduler::*;
pub use stats::*;
