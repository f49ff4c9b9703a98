// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod ledger;
pub mod validation;

pub use chain::*;
pub use ledger::*;
