//! Delegation Table and Runner Totals
//!
//! `(source, runner)` delegation cells and per-runner total cells, kept in
//! lockstep: every change to a delegation applies the same delta to the
//! runner's total at the same lifecycle point.
//!
//! Changes are computed as a [`DelegationChange`] against reconciled copies
//! of the two cells and written back only once the whole entry point has
//! passed its checks.

use crate::core::{Address, Amount, EraId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use super::deferred::DeferredValue;
use super::error::{StakingError, StakingResult};

/// Reconciled, updated copies of a delegation cell and its runner total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationChange {
    pub source: Address,
    pub runner: Address,
    pub delegation: DeferredValue,
    pub total: DeferredValue,
    /// The delegation cell was empty before this change
    pub opened: bool,
}

/// All delegation cells, runner totals and per-source staking indexes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationTable {
    delegations: HashMap<(Address, Address), DeferredValue>,
    totals: HashMap<Address, DeferredValue>,
    /// Runners each source has opened a delegation to, in order
    staking_index: HashMap<Address, Vec<Address>>,
}

impl DelegationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored delegation cell (not reconciled)
    pub fn delegation(&self, source: &Address, runner: &Address) -> DeferredValue {
        self.delegations
            .get(&(*source, *runner))
            .copied()
            .unwrap_or_default()
    }

    /// Stored runner total cell (not reconciled)
    pub fn total(&self, runner: &Address) -> DeferredValue {
        self.totals.get(runner).copied().unwrap_or_default()
    }

    /// Runners `source` has delegated to
    pub fn staking_index(&self, source: &Address) -> &[Address] {
        self.staking_index
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Delegation and total cells reconciled against `era`
    pub fn reconciled(
        &self,
        source: &Address,
        runner: &Address,
        era: EraId,
    ) -> (DeferredValue, DeferredValue) {
        (
            self.delegation(source, runner).reconciled(era),
            self.total(runner).reconciled(era),
        )
    }

    /// Reconcile both cells in place. Absent cells stay absent, and a
    /// delegation that reconciles to empty leaves the staking index.
    pub fn reflect_era_update(&mut self, source: &Address, runner: &Address, era: EraId) {
        if let Some(delegation) = self.delegations.get_mut(&(*source, *runner)) {
            delegation.reconcile(era);
        }
        if let Some(total) = self.totals.get_mut(runner) {
            total.reconcile(era);
        }
        self.prune(source, runner);
    }

    /// Compute the effect of delegating `amount` from `source` to `runner`.
    ///
    /// A runner with no stake at all can only be opened by its own
    /// self-delegation, which takes effect immediately. Every other
    /// delegation lands in `value_after`.
    pub fn plan_add(
        &self,
        source: &Address,
        runner: &Address,
        amount: Amount,
        era: EraId,
    ) -> StakingResult<DelegationChange> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let (mut delegation, mut total) = self.reconciled(source, runner, era);
        let opened = delegation.is_empty();

        let self_stake = if source == runner {
            delegation
        } else {
            self.delegation(runner, runner).reconciled(era)
        };

        if self_stake.is_empty() && total.is_empty() {
            if source != runner {
                return Err(StakingError::FirstStakeNotFromRunner {
                    delegator: *source,
                    runner: *runner,
                });
            }
            delegation = DeferredValue::settled(era, amount);
            total = DeferredValue::settled(era, amount);
        } else {
            delegation.value_after = delegation
                .value_after
                .checked_add(amount)
                .ok_or(StakingError::AmountOverflow)?;
            total.value_after = total
                .value_after
                .checked_add(amount)
                .ok_or(StakingError::AmountOverflow)?;
        }

        Ok(DelegationChange {
            source: *source,
            runner: *runner,
            delegation,
            total,
            opened,
        })
    }

    /// Compute the effect of removing `amount` from a delegation. The
    /// decrease settles at the next era boundary.
    pub fn plan_remove(
        &self,
        source: &Address,
        runner: &Address,
        amount: Amount,
        era: EraId,
    ) -> StakingResult<DelegationChange> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let (mut delegation, mut total) = self.reconciled(source, runner, era);
        let insufficient = StakingError::InsufficientDelegation {
            requested: amount,
            available: delegation.value_after,
        };

        delegation.value_after = delegation
            .value_after
            .checked_sub(amount)
            .ok_or_else(|| insufficient.clone())?;
        total.value_after = total.value_after.checked_sub(amount).ok_or(insufficient)?;

        Ok(DelegationChange {
            source: *source,
            runner: *runner,
            delegation,
            total,
            opened: false,
        })
    }

    /// Compute the effect of slashing `amount` directly from a runner's own
    /// stake. Both current and pending values drop immediately.
    pub fn plan_slash(
        &self,
        runner: &Address,
        amount: Amount,
        era: EraId,
    ) -> StakingResult<DelegationChange> {
        let (mut delegation, mut total) = self.reconciled(runner, runner, era);
        let exceeds = || StakingError::SlashExceedsAvailable { requested: amount };

        delegation.value_at = delegation.value_at.checked_sub(amount).ok_or_else(exceeds)?;
        delegation.value_after = delegation.value_after.checked_sub(amount).ok_or_else(exceeds)?;
        total.value_at = total.value_at.checked_sub(amount).ok_or_else(exceeds)?;
        total.value_after = total.value_after.checked_sub(amount).ok_or_else(exceeds)?;

        Ok(DelegationChange {
            source: *runner,
            runner: *runner,
            delegation,
            total,
            opened: false,
        })
    }

    /// Write back a planned change
    pub fn apply(&mut self, change: DelegationChange) {
        self.delegations
            .insert((change.source, change.runner), change.delegation);
        self.totals.insert(change.runner, change.total);

        if change.opened {
            let index = self.staking_index.entry(change.source).or_default();
            if !index.contains(&change.runner) {
                index.push(change.runner);
            }
        }
        self.prune(&change.source, &change.runner);
    }

    /// Drop an empty delegation cell along with its staking index entry
    fn prune(&mut self, source: &Address, runner: &Address) {
        let key = (*source, *runner);
        if !self.delegations.get(&key).map_or(false, DeferredValue::is_empty) {
            return;
        }
        self.delegations.remove(&key);
        if let Some(index) = self.staking_index.get_mut(source) {
            index.retain(|r| r != runner);
            if index.is_empty() {
                self.staking_index.remove(source);
            }
        }
    }

    /// Iterate over every stored delegation cell
    pub fn iter(&self) -> impl Iterator<Item = (&(Address, Address), &DeferredValue)> {
        self.delegations.iter()
    }
}
