//! Trade submission and settlement

pub mod submitter;
pub mod simulation;
pub mod coordinator;

pub use submitter::*;
pub use simulation::*;
pub use coordinator::*;
