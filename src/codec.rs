//! Canonical serialization and hashing shared by blocks and signatures.
//!
//! Values are routed through `serde_json::Value`, whose object map keeps keys
//! sorted, so two structurally equal records always produce the same bytes no
//! matter the order their fields were declared or built in.

use crate::error::ChainError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest.
pub type HashDigest = String;

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Serializes `value` with object keys in lexicographic order at every level.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ChainError> {
    let tree = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&tree)?)
}

/// SHA-256 of the canonical serialization, hex encoded.
pub fn hash<T: Serialize + ?Sized>(value: &T) -> Result<HashDigest, ChainError> {
    let bytes = canonical_bytes(value)?;
    Ok(hash_bytes(&bytes))
}

pub fn hash_bytes(bytes: &[u8]) -> HashDigest {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Forward {
        id: u64,
        tag: &'static str,
    }

    #[derive(Serialize)]
    struct Reversed {
        tag: &'static str,
        id: u64,
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a = canonical_bytes(&Forward { id: 1, tag: "x" }).unwrap();
        let b = canonical_bytes(&Reversed { tag: "x", id: 1 }).unwrap();
        assert_eq!(a, b);
        assert_eq!(String::from_utf8(a).unwrap(), r#"{"id":1,"tag":"x"}"#);
    }

    #[test]
    fn test_map_keys_sorted() {
        let mut map = HashMap::new();
        map.insert("to", "bob");
        map.insert("from", "alice");
        map.insert("amount", "5");
        let bytes = canonical_bytes(&map).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"amount":"5","from":"alice","to":"bob"}"#
        );
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let digest = hash(&Forward { id: 7, tag: "y" }).unwrap();
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash(&Reversed { tag: "y", id: 7 }).unwrap());
        assert_ne!(digest, hash(&Forward { id: 8, tag: "y" }).unwrap());
    }

    #[test]
    fn test_hash_bytes_known_vector() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
