//! AirChip - a single-node token ledger secured by proof-of-work
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, the ledger and chain validation
//! - [`transaction`] - Transaction types and operations
//! - [`codec`] - Canonical serialization and hashing
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work search with cancellation
//! - [`reward`] - Injected mining reward policies
//!
//! ## Cryptography
//! - [`crypto`] - Signature provider trait and secp256k1 backend
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`economics`] - Token value metric
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod codec;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;
pub mod reward;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod economics;
pub mod error;
