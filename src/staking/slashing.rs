//! Runner slashing
//!
//! A slash is taken from the runner's own unbonding queue first, oldest slot
//! first, and only the remainder from its live self-stake. The live part
//! bypasses the deferred model: both current and pending values drop at
//! once.

use crate::core::{Address, Amount, EraId};
use super::delegation::{DelegationChange, DelegationTable};
use super::error::{StakingError, StakingResult};
use super::unbonding::UnbondingQueue;

/// Staged result of slashing a runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashPlan {
    pub runner: Address,
    pub amount: Amount,
    /// Runner queue after the queued part was taken
    pub queue: UnbondingQueue,
    /// Self-stake change for the part the queue could not cover
    pub stake_change: Option<DelegationChange>,
    pub from_queue: Amount,
    pub from_stake: Amount,
}

impl SlashPlan {
    /// Stage a slash of `amount` against `runner`.
    ///
    /// Fails if the queue and the self-stake together cannot cover it.
    pub fn build(
        queue: &UnbondingQueue,
        delegations: &DelegationTable,
        runner: &Address,
        amount: Amount,
        era: EraId,
    ) -> StakingResult<Self> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }

        let mut queue = queue.clone();
        let from_queue = queue.slash(amount);
        let from_stake = amount - from_queue;

        let stake_change = if from_stake > 0 {
            Some(
                delegations
                    .plan_slash(runner, from_stake, era)
                    .map_err(|_| StakingError::SlashExceedsAvailable { requested: amount })?,
            )
        } else {
            None
        };

        Ok(Self {
            runner: *runner,
            amount,
            queue,
            stake_change,
            from_queue,
            from_stake,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::unbonding::UnbondType;

    fn setup(self_stake: Amount, queued: &[Amount]) -> (Address, DelegationTable, UnbondingQueue) {
        let runner = Address::derive("runner");
        let mut table = DelegationTable::new();
        table.apply(table.plan_add(&runner, &runner, self_stake, 1).unwrap());

        let mut queue = UnbondingQueue::default();
        for amount in queued {
            queue.push(runner, *amount, 0, UnbondType::Unstake, 20).unwrap();
        }
        (runner, table, queue)
    }

    #[test]
    fn test_slash_from_queue_only() {
        let (runner, table, queue) = setup(1000, &[30, 50]);
        let plan = SlashPlan::build(&queue, &table, &runner, 40, 1).unwrap();

        assert_eq!(plan.from_queue, 40);
        assert_eq!(plan.from_stake, 0);
        assert!(plan.stake_change.is_none());
        assert_eq!(plan.queue.withdrawn_length(), 1);
        assert_eq!(plan.queue.get(1).unwrap().amount, 40);
    }

    #[test]
    fn test_slash_spills_into_stake() {
        let (runner, table, queue) = setup(1000, &[60]);
        let plan = SlashPlan::build(&queue, &table, &runner, 100, 1).unwrap();

        assert_eq!(plan.from_queue, 60);
        assert_eq!(plan.from_stake, 40);
        assert_eq!(plan.queue.live_count(), 0);
        assert_eq!(plan.queue.withdrawn_length(), 1);

        let change = plan.stake_change.unwrap();
        assert_eq!(change.delegation.value_at, 960);
        assert_eq!(change.delegation.value_after, 960);
        assert_eq!(change.total.value_at, 960);
        assert_eq!(change.total.value_after, 960);
    }

    #[test]
    fn test_slash_beyond_available_fails() {
        let (runner, table, queue) = setup(100, &[10]);
        assert_eq!(
            SlashPlan::build(&queue, &table, &runner, 111, 1),
            Err(StakingError::SlashExceedsAvailable { requested: 111 })
        );
        assert_eq!(
            SlashPlan::build(&queue, &table, &runner, 0, 1),
            Err(StakingError::ZeroAmount)
        );
    }
}
