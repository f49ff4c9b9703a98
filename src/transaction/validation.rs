/// Validation logic for transactions separated from type definitions
use crate::crypto::{SignatureProvider, Verification};
use crate::error::ChainError;
use crate::transaction::types::{Transaction, MAX_TRANSACTION_SIZE};

impl Transaction {
    /// Validate transaction size to prevent DoS attacks
    pub fn validate_size(&self) -> Result<(), ChainError> {
        let serialized = bincode::serialize(self)
            .map_err(|e| ChainError::InvalidTransaction(format!("Serialization failed: {}", e)))?;

        if serialized.len() > MAX_TRANSACTION_SIZE {
            return Err(ChainError::InvalidTransaction(format!(
                "Transaction too large: {} bytes (max: {})",
                serialized.len(),
                MAX_TRANSACTION_SIZE
            )));
        }
        Ok(())
    }

    /// Stateless checks: accounts, amount bounds and size.
    /// Does NOT look at balances or signatures.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.from.is_empty() {
            return Err(ChainError::InvalidTransaction(
                "Sender account cannot be empty".to_string(),
            ));
        }
        if self.to.is_empty() {
            return Err(ChainError::InvalidTransaction(
                "Recipient account cannot be empty".to_string(),
            ));
        }
        if self.amount == 0 && !self.is_reserved_sender() {
            return Err(ChainError::InvalidTransaction(
                "Transfer amount must be greater than zero".to_string(),
            ));
        }
        if i64::try_from(self.amount).is_err() {
            return Err(ChainError::InvalidTransaction(format!(
                "Transfer amount {} exceeds the ledger range",
                self.amount
            )));
        }

        self.validate_size()
    }

    /// Checks the attached signature against `public_key`.
    pub fn verify_signature(
        &self,
        provider: &dyn SignatureProvider,
        public_key: &[u8],
    ) -> Verification {
        let signature = match &self.signature {
            Some(sig) => sig,
            None => return Verification::Malformed("Transaction not signed".to_string()),
        };

        match self.signable_message() {
            Ok(message) => provider.verify(&message, signature, public_key),
            Err(e) => Verification::Malformed(e.to_string()),
        }
    }
}
