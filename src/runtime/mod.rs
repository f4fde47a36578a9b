//! Reference runtime for the staking ledger
//!
//! In-memory implementations of the ledger's collaborators, used by the
//! replay tool and the tests.

pub mod bank;
pub mod host;

pub use bank::TokenBank;
pub use host::{MemoryHost, DEFAULT_ERA_PERIOD};
