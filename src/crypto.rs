//! Cryptographic primitives for AirChip
//!
//! The ledger only depends on [`SignatureProvider`]; keys cross that boundary
//! as opaque byte handles. [`Secp256k1Provider`] is the default backend.

use crate::error::ChainError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Outcome of a signature check.
///
/// `Invalid` and `Malformed` both mean "not verified"; the reason carried by
/// `Malformed` is diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
    Malformed(String),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    /// Converts a failed check into `ChainError::InvalidSignature`.
    pub fn into_result(self) -> Result<(), ChainError> {
        match self {
            Verification::Valid => Ok(()),
            Verification::Invalid => Err(ChainError::InvalidSignature(
                "Signature verification failed".to_string(),
            )),
            Verification::Malformed(reason) => Err(ChainError::InvalidSignature(reason)),
        }
    }
}

/// Sign/verify capability consumed by the chain.
pub trait SignatureProvider: Send + Sync {
    /// Returns `(private_key, public_key)`.
    fn generate_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), ChainError>;

    fn sign(&self, data: &[u8], private_key: &[u8]) -> Result<Vec<u8>, ChainError>;

    /// Must never panic; decoding problems collapse into `Malformed`.
    fn verify(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> Verification;
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::CryptoError(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::CryptoError(format!("Invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.secret_key.secret_bytes()
    }

    /// Returns the KeyPair's public key as a compressed byte array.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key.serialize()
    }

    /// Signs the SHA-256 digest of `message` and returns the compact signature.
    pub fn sign(&self, message: &[u8]) -> [u8; COMPACT_SIGNATURE_SIZE] {
        let digest: [u8; 32] = Sha256::digest(message).into();
        let message = Message::from_digest(digest);
        SECP256K1_CONTEXT
            .sign_ecdsa(&message, &self.secret_key)
            .serialize_compact()
    }
}

/// Verifies an ECDSA signature given the raw public key bytes, message, and signature bytes.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Verification {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Verification::Malformed(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        ));
    }
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Verification::Malformed(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            signature_bytes.len()
        ));
    }

    let public_key = match PublicKey::from_slice(public_key_bytes) {
        Ok(key) => key,
        Err(e) => return Verification::Malformed(format!("Invalid public key: {}", e)),
    };
    let signature = match Signature::from_compact(signature_bytes) {
        Ok(sig) => sig,
        Err(e) => return Verification::Malformed(format!("Invalid signature encoding: {}", e)),
    };

    let digest: [u8; 32] = Sha256::digest(message).into();
    let message = Message::from_digest(digest);

    match SECP256K1_CONTEXT.verify_ecdsa(&message, &signature, &public_key) {
        Ok(()) => Verification::Valid,
        Err(_) => Verification::Invalid,
    }
}

/// ECDSA over secp256k1 with SHA-256 message digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Provider;

impl SignatureProvider for Secp256k1Provider {
    fn generate_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), ChainError> {
        let keypair = KeyPair::generate();
        Ok((
            keypair.secret_key_bytes().to_vec(),
            keypair.public_key_bytes().to_vec(),
        ))
    }

    fn sign(&self, data: &[u8], private_key: &[u8]) -> Result<Vec<u8>, ChainError> {
        let keypair = KeyPair::from_secret_bytes(private_key)?;
        Ok(keypair.sign(data).to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> Verification {
        verify_signature(public_key, data, signature)
    }
}
