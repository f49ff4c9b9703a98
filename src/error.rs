//! Error types for AirChip

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    InsufficientFunds {
        account: String,
        available: i64,
        requested: u64,
    },
    InvalidSignature(String),
    InvalidBlockLinkage {
        expected: String,
        actual: String,
    },
    InvalidProofOfWork(String),
    InvalidTransaction(String),
    InvalidBlock(String),
    DoubleSpendDetected(String),
    MiningCancelled,
    NonceExhausted,
    CryptoError(String),
    SerializationError(String),
    BincodeError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InsufficientFunds {
                account,
                available,
                requested,
            } => write!(
                f,
                "Insufficient funds for {}: available {}, requested {}",
                account, available, requested
            ),
            ChainError::InvalidSignature(msg) => write!(f, "Invalid signature: {}", msg),
            ChainError::InvalidBlockLinkage { expected, actual } => write!(
                f,
                "Invalid block linkage: expected previous hash {}, got {}",
                expected, actual
            ),
            ChainError::InvalidProofOfWork(msg) => write!(f, "Invalid proof of work: {}", msg),
            ChainError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {}", msg),
            ChainError::InvalidBlock(msg) => write!(f, "Invalid block: {}", msg),
            ChainError::DoubleSpendDetected(msg) => write!(f, "Double spend detected: {}", msg),
            ChainError::MiningCancelled => write!(f, "Mining cancelled"),
            ChainError::NonceExhausted => write!(f, "Nonce space exhausted"),
            ChainError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            ChainError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ChainError::BincodeError(msg) => write!(f, "Bincode error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for ChainError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        ChainError::BincodeError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = ChainError::InsufficientFunds {
            account: "alice".to_string(),
            available: 0,
            requested: 100,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds for alice: available 0, requested 100"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChainError = io.into();
        assert!(matches!(err, ChainError::IoError(_)));
    }
}
