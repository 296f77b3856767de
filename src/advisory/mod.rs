//! Optional advisory second opinion

pub mod client;
pub mod gate;

pub use client::*;
pub use gate::*;
