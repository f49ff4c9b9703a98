use crate::transaction::{AccountId, Transaction, SYSTEM_ACCOUNT};
use std::collections::{BTreeMap, HashMap};

/// Account balances. Only the chain mutates this, and only with transactions
/// from a block that already passed linkage and proof-of-work checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ledger {
    balances: HashMap<AccountId, i64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding `supply` on the genesis account.
    pub fn with_genesis_supply(supply: i64) -> Self {
        let mut ledger = Self::new();
        ledger
            .balances
            .insert(crate::transaction::GENESIS_ACCOUNT.to_string(), supply);
        ledger
    }

    pub fn balance_of(&self, account: &str) -> i64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Settles `transactions` in order. The system account mints rewards and
    /// is never debited; the genesis account spends from its initial supply.
    /// Balances are not checked here; staging is the admission gate.
    pub fn apply_batch(&mut self, transactions: &[Transaction]) {
        for tx in transactions {
            let amount = i64::try_from(tx.amount).unwrap_or(i64::MAX);
            if tx.from != SYSTEM_ACCOUNT {
                let sender = self.balances.entry(tx.from.clone()).or_insert(0);
                *sender = sender.saturating_sub(amount);
            }
            let recipient = self.balances.entry(tx.to.clone()).or_insert(0);
            *recipient = recipient.saturating_add(amount);
        }
    }

    /// Read-only, account-sorted copy for presentation.
    pub fn snapshot(&self) -> BTreeMap<AccountId, i64> {
        self.balances
            .iter()
            .map(|(account, balance)| (account.clone(), *balance))
            .collect()
    }

    pub fn total_supply(&self) -> i128 {
        self.balances.values().map(|b| *b as i128).sum()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
