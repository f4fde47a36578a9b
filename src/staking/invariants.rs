//! Ledger invariant checker

use crate::core::{Address, Amount};
use std::collections::HashMap;
use super::ledger::LedgerState;

/// A violated ledger invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Runner total of {runner} is {total}, delegations sum to {sum}")]
    TotalMismatch { runner: Address, total: Amount, sum: Amount },

    #[error("Unbonding cursors of {0} out of order")]
    CursorOrder(Address),

    #[error("Unbonding queue of {source_addr} has {live} live slots, max {max}")]
    QueueOverCapacity { source_addr: Address, live: u64, max: u64 },

    #[error("Locked amount of {account} is {locked}, holdings are {held}")]
    LockedMismatch { account: Address, locked: Amount, held: Amount },

    #[error("Runner registry index broken at slot {0}")]
    RegistryIndex(usize),
}

/// Check all invariants. Returns the first one violated.
pub fn check_invariants(state: &LedgerState, max_unbonding_requests: u64) -> Result<(), InvariantViolation> {
    // Runner totals track the sum of pending delegation values
    let mut sums: HashMap<Address, Amount> = HashMap::new();
    let mut held: HashMap<Address, Amount> = HashMap::new();
    for ((source, runner), cell) in state.delegations.iter() {
        *sums.entry(*runner).or_default() += cell.value_after;
        *held.entry(*source).or_default() += cell.value_after;
    }
    for (runner, sum) in &sums {
        let total = state.delegations.total(runner).value_after;
        if total != *sum {
            return Err(InvariantViolation::TotalMismatch { runner: *runner, total, sum: *sum });
        }
    }

    for (source, queue) in &state.unbonding {
        if queue.withdrawn_length() > queue.unbonding_length() {
            return Err(InvariantViolation::CursorOrder(*source));
        }
        if queue.live_count() > max_unbonding_requests {
            return Err(InvariantViolation::QueueOverCapacity {
                source_addr: *source,
                live: queue.live_count(),
                max: max_unbonding_requests,
            });
        }
        *held.entry(*source).or_default() += queue.total_pending();
    }

    // Locked amount covers exactly active delegations plus pending unbonds
    for account in held.keys().chain(state.locked.keys()) {
        let locked = state.locked.get(account).copied().unwrap_or(0);
        let holding = held.get(account).copied().unwrap_or(0);
        if locked != holding {
            return Err(InvariantViolation::LockedMismatch {
                account: *account,
                locked,
                held: holding,
            });
        }
    }

    for (slot, runner) in state.runners.runners().iter().enumerate() {
        if state.runners.slot_of(runner) != Some(slot) {
            return Err(InvariantViolation::RegistryIndex(slot));
        }
    }

    Ok(())
}
