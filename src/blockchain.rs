// Thin re-export module: implementation is in `blockchain/core.rs` to allow
// progressive decomposition of blockchain responsibilities (validation,
// ledger settlement, chain management).

pub mod core;
pub use core::*;
