//! Single-use settlement nonces

use alloy::primitives::B256;
use rand::Rng;
use std::collections::HashSet;
use crate::errors::{BotError, BotResult};

/// 32 bytes from the thread-local CSPRNG (seeded from the OS).
pub fn generate_nonce() -> B256 {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    B256::from(bytes)
}

/// Tracks every nonce issued by this process and whether it has been
/// spent on a settlement submission.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    issued: HashSet<B256>,
    spent: HashSet<B256>,
}

impl NonceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a nonce never issued before in this process.
    pub fn issue(&mut self) -> B256 {
        loop {
            let nonce = generate_nonce();
            if self.issued.insert(nonce) {
                return nonce;
            }
        }
    }

    /// Marks `nonce` as submitted. A nonce can be spent once.
    pub fn spend(&mut self, nonce: B256) -> BotResult<()> {
        if !self.issued.contains(&nonce) {
            return Err(BotError::Signing {
                message: format!("nonce {} was not issued by this signer", nonce),
            });
        }
        if !self.spent.insert(nonce) {
            return Err(BotError::NonceReplay {
                nonce: nonce.to_string(),
            });
        }
        Ok(())
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
