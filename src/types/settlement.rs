//! Signed settlement instruction

use alloy::primitives::{Address, B256, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Instruction authorizing release of trade proceeds to a recipient.
///
/// `payload_hash` commits to `(token, amount, recipient, nonce)` and
/// `signature` is the agent's signature over that hash. The nonce is
/// single-use for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementPayload {
    pub token: Address,
    pub amount: U256,
    pub recipient: Address,
    pub nonce: B256,
    pub payload_hash: B256,
    pub signature: Bytes,
    pub signer: Address,
    pub signed_at: DateTime<Utc>,
}
