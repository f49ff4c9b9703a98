/// Transaction types for AirChip
use crate::codec::{self, HashDigest};
use crate::crypto::SignatureProvider;
use crate::error::ChainError;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a ledger participant.
pub type AccountId = String;

/// Source of the initial supply.
pub const GENESIS_ACCOUNT: &str = "genesis";
/// Source of mining rewards.
pub const SYSTEM_ACCOUNT: &str = "system";

/// Maximum transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// Reserved senders mint tokens: no balance check, no signature check.
pub fn is_reserved(account: &str) -> bool {
    account == GENESIS_ACCOUNT || account == SYSTEM_ACCOUNT
}

/// A transfer of `amount` tokens from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u64,
    /// Unix milliseconds, UTC.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub signature: Option<Vec<u8>>,
}

/// The fields covered by a transaction signature.
#[derive(Serialize)]
struct SignablePayload<'a> {
    amount: u64,
    from: &'a str,
    timestamp: u64,
    to: &'a str,
}

impl Transaction {
    pub fn new(from: impl Into<AccountId>, to: impl Into<AccountId>, amount: u64) -> Self {
        Self::with_timestamp(from, to, amount, now_millis())
    }

    pub fn with_timestamp(
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        amount: u64,
        timestamp: u64,
    ) -> Self {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp,
            signature: None,
        }
    }

    /// Reward paid by the system account to a miner.
    pub fn reward(miner: impl Into<AccountId>, amount: u64) -> Self {
        Self::new(SYSTEM_ACCOUNT, miner, amount)
    }

    pub fn is_reserved_sender(&self) -> bool {
        is_reserved(&self.from)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    fn payload(&self) -> SignablePayload<'_> {
        SignablePayload {
            amount: self.amount,
            from: &self.from,
            timestamp: self.timestamp,
            to: &self.to,
        }
    }

    /// Canonical bytes of `{amount, from, timestamp, to}`; the signature is excluded.
    pub fn signable_message(&self) -> Result<Vec<u8>, ChainError> {
        codec::canonical_bytes(&self.payload())
    }

    /// Digest of the signed fields. Identifies an authorization independently
    /// of the signature bytes attached to it.
    pub fn payload_hash(&self) -> Result<HashDigest, ChainError> {
        codec::hash(&self.payload())
    }

    pub fn sign(&mut self, signature: Vec<u8>) {
        self.signature = Some(signature);
    }

    /// Signs the canonical message with `provider` and attaches the signature.
    pub fn sign_with(
        &mut self,
        provider: &dyn SignatureProvider,
        private_key: &[u8],
    ) -> Result<(), ChainError> {
        let message = self.signable_message()?;
        let signature = provider.sign(&message, private_key)?;
        self.sign(signature);
        Ok(())
    }

    /// Digest of the whole record, signature included.
    pub fn hash(&self) -> Result<HashDigest, ChainError> {
        codec::hash(self)
    }
}

pub(crate) fn now_millis() -> u64 {
    // Clocks before 1970 clamp to zero.
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
