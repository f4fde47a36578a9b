//! Era-Indexed Staking Ledger
//!
//! Tracks how much each source has committed to each runner, with changes
//! taking effect at the next era boundary, and manages the bounded queue of
//! pending withdrawals.
//!
//! # Components
//! - **Deferred values**: `{ era, value_at, value_after }` cells
//! - **Delegation table**: `(source, runner)` cells plus per-runner totals
//! - **Unbonding queue**: per-source, capped, merge-on-overflow
//! - **Runner registry**: swap-remove arena of active runners
//! - **Slashing**: queue first, then live self-stake
//!
//! The ledger reaches the token, the era counter and the reward engine
//! only through the [`StakingHost`] traits.

pub mod access;
pub mod deferred;
pub mod delegation;
pub mod error;
pub mod events;
pub mod host;
pub mod invariants;
pub mod ledger;
pub mod params;
pub mod registry;
pub mod slashing;
pub mod unbonding;


pub use access::{AddressBook, CallContext, Role};
pub use deferred::DeferredValue;
pub use delegation::{DelegationChange, DelegationTable};
pub use error::{ErrorKind, StakingError, StakingResult};
pub use events::StakingEvent;
pub use host::{EraClock, RewardEngine, StakingHost, Transfer, TransferError, ValueTransfer};
pub use invariants::{check_invariants, InvariantViolation};
pub use ledger::{LedgerSnapshot, LedgerState, SharedStakingLedger, StakingLedger};
pub use params::{ParamsError, StakingParam, StakingParams, PER_MILL};
pub use registry::RunnerRegistry;
pub use slashing::SlashPlan;
pub use unbonding::{Admission, UnbondType, UnbondingQueue, UnbondingRequest};
