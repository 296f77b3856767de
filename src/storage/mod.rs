//! Data persistence and file operations

pub mod journal;
pub mod cycles;
pub mod executions;
pub mod events;

pub use journal::*;
pub use events::*;
