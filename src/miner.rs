//! Proof-of-work mining
//!
//! The search walks nonces upward from zero with no upper bound besides the
//! `u64` nonce space, so mining time is unbounded in the worst case. Callers
//! that need a deadline hold a [`CancelToken`] and cancel it from elsewhere.

use crate::blockchain::Block;
use crate::codec::HashDigest;
use crate::error::ChainError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default number of leading hex zeros required in a block hash.
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Hex digits in a SHA-256 digest; no difficulty above this can be met.
pub const MAX_DIFFICULTY: usize = 64;

const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Shared flag that stops an in-flight nonce search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        ProofOfWork { difficulty }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// True when `hash` starts with `difficulty` hex zeros.
    pub fn meets_difficulty(&self, hash: &str) -> bool {
        hash.len() >= self.difficulty && hash.bytes().take(self.difficulty).all(|b| b == b'0')
    }

    /// Resets the nonce to zero and increments it until the block hash meets
    /// the difficulty. Returns the winning hash; `block.nonce` holds the nonce.
    pub fn search(
        &self,
        block: &mut Block,
        cancel: &CancelToken,
    ) -> Result<HashDigest, ChainError> {
        block.nonce = 0;
        loop {
            if cancel.is_cancelled() {
                debug!(
                    index = block.index,
                    nonce = block.nonce,
                    "proof-of-work search cancelled"
                );
                return Err(ChainError::MiningCancelled);
            }

            let hash = block.compute_hash()?;
            if self.meets_difficulty(&hash) {
                debug!(index = block.index, nonce = block.nonce, %hash, "proof-of-work found");
                return Ok(hash);
            }

            block.nonce = match block.nonce.checked_add(1) {
                Some(nonce) => nonce,
                None => return Err(ChainError::NonceExhausted),
            };
            if block.nonce % PROGRESS_INTERVAL == 0 {
                debug!(
                    index = block.index,
                    nonce = block.nonce,
                    "proof-of-work still searching"
                );
            }
        }
    }

    /// Recomputes the block hash once and checks it against `proof`.
    pub fn verify(&self, block: &Block, proof: &str) -> Result<(), ChainError> {
        if !self.meets_difficulty(proof) {
            return Err(ChainError::InvalidProofOfWork(format!(
                "hash {} does not have {} leading zeros",
                proof, self.difficulty
            )));
        }

        let computed = block.compute_hash()?;
        if computed != proof {
            return Err(ChainError::InvalidProofOfWork(format!(
                "proof {} does not match block hash {}",
                proof, computed
            )));
        }
        Ok(())
    }
}

/// Runs the search and stores the resulting hash on the block.
pub fn mine_block(
    mut block: Block,
    pow: &ProofOfWork,
    cancel: &CancelToken,
) -> Result<Block, ChainError> {
    let hash = pow.search(&mut block, cancel)?;
    block.hash = hash;
    Ok(block)
}
