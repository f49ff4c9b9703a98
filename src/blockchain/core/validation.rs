use crate::codec::HashDigest;
use crate::error::ChainError;
use crate::transaction::Transaction;
use std::collections::HashSet;

use super::chain::{Block, Blockchain, GENESIS_PREVIOUS_HASH};

fn validate_genesis(block: &Block) -> Result<(), ChainError> {
    if !block.is_genesis()
        || block.previous_hash != GENESIS_PREVIOUS_HASH
        || !block.transactions.is_empty()
    {
        return Err(ChainError::InvalidBlock(
            "Genesis block must have index 0, previous hash \"0\" and no transactions.".to_string(),
        ));
    }
    let computed = block.compute_hash()?;
    if computed != block.hash {
        return Err(ChainError::InvalidBlock(format!(
            "Genesis hash mismatch. Expected {}, but got {}.",
            computed, block.hash
        )));
    }
    Ok(())
}

/// Rejects a batch that settles the same signed transfer twice, or one whose
/// payload is already in `confirmed`. Returns the payload hashes of the
/// batch's signed transactions.
pub fn validate_no_double_spend(
    transactions: &[Transaction],
    confirmed: &HashSet<HashDigest>,
) -> Result<Vec<HashDigest>, ChainError> {
    let mut seen = Vec::new();
    for tx in transactions.iter().filter(|tx| tx.is_signed()) {
        let payload = tx.payload_hash()?;
        if confirmed.contains(&payload) {
            return Err(ChainError::DoubleSpendDetected(format!(
                "transfer {} from {} is already confirmed",
                payload, tx.from
            )));
        }
        if seen.contains(&payload) {
            return Err(ChainError::DoubleSpendDetected(format!(
                "transfer {} from {} appears twice in the block",
                payload, tx.from
            )));
        }
        seen.push(payload);
    }
    Ok(seen)
}

impl Blockchain {
    /// Re-verifies the whole history: genesis shape, linkage, indices,
    /// proof-of-work, replayed signed transfers, and the signatures of signed
    /// transactions whose sender has a registered key. Returns the first
    /// violation found.
    pub fn validate_chain(&self) -> Result<(), ChainError> {
        let genesis = self
            .blocks
            .first()
            .ok_or_else(|| ChainError::InvalidBlock("Chain is empty.".to_string()))?;
        validate_genesis(genesis)?;

        let mut settled = HashSet::new();
        for pair in self.blocks.windows(2) {
            let (previous, block) = (&pair[0], &pair[1]);

            if block.previous_hash != previous.hash {
                return Err(ChainError::InvalidBlockLinkage {
                    expected: previous.hash.clone(),
                    actual: block.previous_hash.clone(),
                });
            }
            if block.index != previous.index + 1 {
                return Err(ChainError::InvalidBlock(format!(
                    "Invalid block index. Expected {}, but got {}.",
                    previous.index + 1,
                    block.index
                )));
            }
            self.pow.verify(block, &block.hash)?;
            settled.extend(validate_no_double_spend(&block.transactions, &settled)?);

            for tx in block.transactions.iter().filter(|tx| tx.is_signed()) {
                if let Some(public_key) = self.public_key_of(&tx.from) {
                    tx.verify_signature(self.signer.as_ref(), public_key)
                        .into_result()
                        .map_err(|e| {
                            ChainError::InvalidBlock(format!("Block {}: {}", block.index, e))
                        })?;
                }
            }
        }
        Ok(())
    }
}
