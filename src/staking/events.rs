//! Ledger events
//!
//! Appended to the ledger's event log after an entry point has applied all
//! of its mutations; a failed entry point emits nothing.

use crate::core::{Address, Amount};
use serde::{Deserialize, Serialize};
use super::params::StakingParam;
use super::unbonding::UnbondType;

/// Event emitted by a completed entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StakingEvent {
    DelegationAdded {
        source: Address,
        runner: Address,
        amount: Amount,
    },
    DelegationRemoved {
        source: Address,
        runner: Address,
        amount: Amount,
    },
    UnbondRequested {
        source: Address,
        runner: Address,
        amount: Amount,
        index: u64,
        unbond_type: UnbondType,
    },
    /// `amount` is what reached the source, after `fee`
    UnbondWithdrawn {
        source: Address,
        amount: Amount,
        fee: Amount,
        index: u64,
    },
    UnbondCancelled {
        source: Address,
        runner: Address,
        amount: Amount,
        index: u64,
    },
    /// `from_queue + from_stake == amount`
    RunnerSlashed {
        runner: Address,
        amount: Amount,
        from_queue: Amount,
        from_stake: Amount,
    },
    ParameterChanged {
        param: StakingParam,
        value: u64,
    },
}
