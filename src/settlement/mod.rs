//! Signed settlement instructions

pub mod nonce;
pub mod signer;

pub use nonce::*;
pub use signer::*;
