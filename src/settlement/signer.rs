//! Settlement payload hashing and signing

use alloy::{
    primitives::{keccak256, Address, Bytes, PrimitiveSignature, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
    sol_types::SolValue,
};
use chrono::Utc;
use std::str::FromStr;
use tracing::info;
use super::NonceRegistry;
use crate::errors::{BotError, BotResult};
use crate::types::SettlementPayload;

/// `keccak256(abi.encodePacked(address token, uint256 amount, address recipient, bytes32 nonce))`
pub fn payload_hash(token: Address, amount: U256, recipient: Address, nonce: B256) -> B256 {
    keccak256((token, amount, recipient, nonce).abi_encode_packed())
}

pub struct SettlementSigner {
    signer: PrivateKeySigner,
    nonces: NonceRegistry,
}

impl SettlementSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            signer,
            nonces: NonceRegistry::new(),
        }
    }

    pub fn from_private_key(private_key: &str) -> BotResult<Self> {
        let signer = PrivateKeySigner::from_str(private_key.trim()).map_err(|e| BotError::Signing {
            message: format!("invalid private key: {}", e),
        })?;
        Ok(Self::new(signer))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs an instruction releasing `amount` of `token` to `recipient`
    /// under a fresh nonce. The signature is EIP-191 over the 32 hash bytes.
    pub fn sign(&mut self, token: Address, amount: U256, recipient: Address) -> BotResult<SettlementPayload> {
        let nonce = self.nonces.issue();
        let hash = payload_hash(token, amount, recipient, nonce);
        let signature = self
            .signer
            .sign_message_sync(hash.as_slice())
            .map_err(|e| BotError::Signing {
                message: e.to_string(),
            })?;

        info!(nonce = %nonce, payload_hash = %hash, "✍️ Settlement signed");

        Ok(SettlementPayload {
            token,
            amount,
            recipient,
            nonce,
            payload_hash: hash,
            signature: Bytes::from(signature.as_bytes().to_vec()),
            signer: self.address(),
            signed_at: Utc::now(),
        })
    }

    /// Claims the payload's nonce for submission. Fails on a second claim.
    pub fn consume_nonce(&mut self, payload: &SettlementPayload) -> BotResult<()> {
        self.nonces.spend(payload.nonce)
    }
}

/// Recovers the address that signed `payload`, after checking the hash
/// matches its fields.
pub fn recover_signer(payload: &SettlementPayload) -> BotResult<Address> {
    let expected = payload_hash(payload.token, payload.amount, payload.recipient, payload.nonce);
    if expected != payload.payload_hash {
        return Err(BotError::Signing {
            message: "payload hash does not match payload fields".to_string(),
        });
    }
    let signature = PrimitiveSignature::try_from(payload.signature.as_ref()).map_err(|e| BotError::Signing {
        message: format!("malformed signature: {}", e),
    })?;
    signature
        .recover_address_from_msg(payload.payload_hash.as_slice())
        .map_err(|e| BotError::Signing {
            message: format!("signature recovery failed: {}", e),
        })
}

pub fn verify_payload(payload: &SettlementPayload) -> bool {
    matches!(recover_signer(payload), Ok(addr) if addr == payload.signer)
}
