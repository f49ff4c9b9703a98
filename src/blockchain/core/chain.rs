use crate::codec::{self, HashDigest};
use crate::config::ChainConfig;
use crate::crypto::{Secp256k1Provider, SignatureProvider};
use crate::error::ChainError;
use crate::miner::{CancelToken, ProofOfWork};
use crate::reward::RewardPolicy;
use crate::transaction::types::now_millis;
use crate::transaction::{AccountId, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::ledger::Ledger;
use super::validation::validate_no_double_spend;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: u64,
    pub previous_hash: HashDigest,
    pub nonce: u64,
    /// Empty until the block is sealed or mined.
    pub hash: HashDigest,
}

/// Everything a block commits to; `hash` is left out.
#[derive(Serialize)]
struct BlockContents<'a> {
    index: u64,
    transactions: &'a [Transaction],
    timestamp: u64,
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: HashDigest) -> Self {
        Self::with_timestamp(index, transactions, previous_hash, now_millis())
    }

    pub fn with_timestamp(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: HashDigest,
        timestamp: u64,
    ) -> Self {
        Block {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            hash: HashDigest::new(),
        }
    }

    /// Index 0, no transactions, previous hash `"0"`. Not mined.
    pub fn genesis() -> Result<Self, ChainError> {
        let mut block = Self::new(0, Vec::new(), GENESIS_PREVIOUS_HASH.to_string());
        block.seal()?;
        Ok(block)
    }

    pub fn compute_hash(&self) -> Result<HashDigest, ChainError> {
        codec::hash(&BlockContents {
            index: self.index,
            transactions: &self.transactions,
            timestamp: self.timestamp,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        })
    }

    /// Stores the hash of the current contents.
    pub fn seal(&mut self) -> Result<(), ChainError> {
        self.hash = self.compute_hash()?;
        Ok(())
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// Result of a mining request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MineOutcome {
    Mined {
        index: u64,
        hash: HashDigest,
    },
    /// The pool was empty; nothing changed.
    NothingToMine,
}

/// Read-only view handed to presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot<'a> {
    pub blocks: &'a [Block],
    pub ledger: BTreeMap<AccountId, i64>,
}

/// The ledger's single writer: blocks, the unconfirmed pool and balances.
pub struct Blockchain {
    pub(super) blocks: Vec<Block>,
    pub(super) pending: Vec<Transaction>,
    pub(super) ledger: Ledger,
    pub(super) pow: ProofOfWork,
    pub(super) config: ChainConfig,
    pub(super) public_keys: HashMap<AccountId, Vec<u8>>,
    /// Payload hashes of every signed transfer settled so far.
    pub(super) confirmed: HashSet<HashDigest>,
    pub(super) signer: Box<dyn SignatureProvider>,
}

impl Blockchain {
    /// Create a new `Blockchain` verifying signatures with secp256k1.
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        Self::with_signature_provider(config, Box::new(Secp256k1Provider))
    }

    pub fn with_signature_provider(
        config: ChainConfig,
        signer: Box<dyn SignatureProvider>,
    ) -> Result<Self, ChainError> {
        let supply = i64::try_from(config.genesis_supply).map_err(|_| {
            ChainError::ConfigError(format!(
                "genesis supply {} exceeds the ledger range",
                config.genesis_supply
            ))
        })?;
        let genesis = Block::genesis()?;
        info!(
            hash = %genesis.hash,
            supply,
            difficulty = config.difficulty,
            "created genesis block"
        );

        Ok(Blockchain {
            blocks: vec![genesis],
            pending: Vec::new(),
            ledger: Ledger::with_genesis_supply(supply),
            pow: ProofOfWork::new(config.difficulty),
            config,
            public_keys: HashMap::new(),
            confirmed: HashSet::new(),
            signer,
        })
    }

    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("blockchain always holds the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: the genesis block is always present.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn balance_of(&self, account: &str) -> i64 {
        self.ledger.balance_of(account)
    }

    pub fn ledger_snapshot(&self) -> BTreeMap<AccountId, i64> {
        self.ledger.snapshot()
    }

    pub fn snapshot(&self) -> ChainSnapshot<'_> {
        ChainSnapshot {
            blocks: &self.blocks,
            ledger: self.ledger.snapshot(),
        }
    }

    pub fn proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn signature_provider(&self) -> &dyn SignatureProvider {
        self.signer.as_ref()
    }

    /// Confirmed transactions across all blocks.
    pub fn transaction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.transactions.len()).sum()
    }

    /// Key used to check signatures from `account`. Replaces any earlier key.
    pub fn register_public_key(&mut self, account: impl Into<AccountId>, public_key: Vec<u8>) {
        let account = account.into();
        debug!(%account, "registered public key");
        self.public_keys.insert(account, public_key);
    }

    pub fn public_key_of(&self, account: &str) -> Option<&[u8]> {
        self.public_keys.get(account).map(Vec::as_slice)
    }

    /// Confirmed balance plus the net effect of transactions already pooled.
    pub fn available_balance(&self, account: &str) -> i64 {
        let mut balance = self.ledger.balance_of(account);
        for tx in &self.pending {
            let amount = i64::try_from(tx.amount).unwrap_or(i64::MAX);
            if tx.from == account {
                balance = balance.saturating_sub(amount);
            }
            if tx.to == account {
                balance = balance.saturating_add(amount);
            }
        }
        balance
    }

    /// Stages a transfer built from its parts, unsigned.
    pub fn add_transaction(
        &mut self,
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        amount: u64,
    ) -> Result<(), ChainError> {
        self.submit_transaction(Transaction::new(from, to, amount))
    }

    /// Admits `tx` to the unconfirmed pool or rejects it without side effects.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<(), ChainError> {
        if let Err(e) = self.check_admission(&tx) {
            warn!(
                from = %tx.from,
                to = %tx.to,
                amount = tx.amount,
                "rejected transaction: {}", e
            );
            return Err(e);
        }

        info!(from = %tx.from, to = %tx.to, amount = tx.amount, "staged transaction");
        self.pending.push(tx);
        Ok(())
    }

    fn check_admission(&self, tx: &Transaction) -> Result<(), ChainError> {
        tx.validate()?;
        if tx.is_signed() {
            self.check_not_replayed(tx)?;
        }
        if tx.is_reserved_sender() {
            return Ok(());
        }

        let available = self.available_balance(&tx.from);
        if available < 0 || (available as u64) < tx.amount {
            return Err(ChainError::InsufficientFunds {
                account: tx.from.clone(),
                available,
                requested: tx.amount,
            });
        }

        if tx.is_signed() {
            let public_key = self.public_key_of(&tx.from).ok_or_else(|| {
                ChainError::InvalidSignature(format!("no public key registered for {}", tx.from))
            })?;
            tx.verify_signature(self.signer.as_ref(), public_key)
                .into_result()?;
        } else if self.config.require_signatures {
            return Err(ChainError::InvalidSignature(format!(
                "unsigned transaction from {}",
                tx.from
            )));
        }

        Ok(())
    }

    /// A signed transfer is admitted once: not while an identical payload is
    /// pooled, and never after it has been settled.
    fn check_not_replayed(&self, tx: &Transaction) -> Result<(), ChainError> {
        let payload = tx.payload_hash()?;
        if self.confirmed.contains(&payload) {
            return Err(ChainError::DoubleSpendDetected(format!(
                "transfer {} from {} is already confirmed",
                payload, tx.from
            )));
        }
        for pooled in self.pending.iter().filter(|p| p.is_signed()) {
            if pooled.payload_hash()? == payload {
                return Err(ChainError::DoubleSpendDetected(format!(
                    "transfer {} from {} is already pending",
                    payload, tx.from
                )));
            }
        }
        Ok(())
    }

    /// Snapshots the pool into a candidate block on top of the current tip,
    /// with the reward transaction appended when the policy pays one.
    /// Returns `None` when there is nothing to mine.
    pub fn prepare_block(&self, miner: &str, policy: &dyn RewardPolicy) -> Option<Block> {
        if self.pending.is_empty() {
            return None;
        }

        let mut transactions = self.pending.clone();
        let reward = policy.decide_reward(&transactions);
        if reward > 0 {
            transactions.push(Transaction::reward(miner, reward));
        }

        let last = self.last_block();
        Some(Block::new(last.index + 1, transactions, last.hash.clone()))
    }

    /// Mines the pool into a new block and appends it. Blocks the caller until
    /// a proof is found or `cancel` fires.
    pub fn mine(
        &mut self,
        miner: &str,
        policy: &dyn RewardPolicy,
        cancel: &CancelToken,
    ) -> Result<MineOutcome, ChainError> {
        let mut block = match self.prepare_block(miner, policy) {
            Some(block) => block,
            None => {
                info!("no transactions to mine");
                return Ok(MineOutcome::NothingToMine);
            }
        };

        let proof = self.pow.search(&mut block, cancel).map_err(|e| {
            warn!(index = block.index, "mining stopped: {}", e);
            e
        })?;
        let index = block.index;
        self.add_block(block, &proof)?;
        info!(index, hash = %proof, %miner, "mined block");

        Ok(MineOutcome::Mined { index, hash: proof })
    }

    /// Appends `block` if it links to the tip, `proof` is its valid
    /// proof-of-work and it replays no settled signed transfer, then settles
    /// its transactions. Any failure leaves the chain, pool and ledger
    /// unchanged.
    ///
    /// Balances and signatures are checked at staging, not here: a block
    /// built outside [`Blockchain::prepare_block`] is trusted for
    /// authorization. Run [`Blockchain::validate_chain`] to audit signatures
    /// against the registered keys.
    pub fn add_block(&mut self, mut block: Block, proof: &str) -> Result<(), ChainError> {
        let settled = match self.check_candidate(&block, proof) {
            Ok(settled) => settled,
            Err(e) => {
                warn!(index = block.index, "rejected block: {}", e);
                return Err(e);
            }
        };

        block.hash = proof.to_string();
        self.ledger.apply_batch(&block.transactions);
        self.confirmed.extend(settled);
        self.remove_confirmed(&block.transactions);
        self.blocks.push(block);
        Ok(())
    }

    /// Returns the payload hashes of the block's signed transfers.
    fn check_candidate(&self, block: &Block, proof: &str) -> Result<Vec<HashDigest>, ChainError> {
        let last = self.last_block();
        if block.previous_hash != last.hash {
            return Err(ChainError::InvalidBlockLinkage {
                expected: last.hash.clone(),
                actual: block.previous_hash.clone(),
            });
        }
        if block.index != last.index + 1 {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block index. Expected {}, but got {}.",
                last.index + 1,
                block.index
            )));
        }
        self.pow.verify(block, proof)?;
        validate_no_double_spend(&block.transactions, &self.confirmed)
    }

    /// Drops the pooled transactions the block confirmed. The block carries a
    /// snapshot of the pool, so they form a prefix of it. Signed transfers
    /// settled by a block from elsewhere are dropped wherever they sit.
    fn remove_confirmed(&mut self, confirmed: &[Transaction]) {
        let prefix = self
            .pending
            .iter()
            .zip(confirmed)
            .take_while(|(pooled, included)| pooled == included)
            .count();
        self.pending.drain(..prefix);

        let settled = &self.confirmed;
        self.pending.retain(|tx| {
            !tx.is_signed() || !matches!(tx.payload_hash(), Ok(p) if settled.contains(&p))
        });
    }
}
