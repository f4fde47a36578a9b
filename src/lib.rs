//! # Celereum Staking
//!
//! Era-indexed staking ledger for Celereum runners.
//!
//! ## Core Features
//! - Deferred delegation values that settle at the next era boundary
//! - Leverage limit on delegated stake relative to a runner's own stake
//! - Bounded per-source unbonding queues with merge-on-overflow
//! - Slashing from the unbonding queue first, then live self-stake
//! - Swap-remove runner registry
//! - All-or-nothing entry points over an atomic value-transfer host

pub mod core;
pub mod replay;
pub mod runtime;
pub mod staking;

// Re-exports
pub use crate::core::*;
pub use runtime::{MemoryHost, TokenBank};
pub use replay::{LedgerConfig, ReplayError, ReplayOp, Replayer};
pub use staking::{
    AddressBook, CallContext, DeferredValue, Role, StakingError, StakingEvent, StakingHost,
    StakingLedger, StakingParams, StakingResult, UnbondType, UnbondingQueue, UnbondingRequest,
};

/// Celereum staking version
pub const CELEREUM_STAKING_VERSION: &str = "0.3.0";

/// Celers per CEL (1 CEL = 10^9 celers)
pub const CELERS_PER_CEL: u64 = 1_000_000_000;
