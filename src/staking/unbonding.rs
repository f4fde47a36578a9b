//! Unbonding Queue
//!
//! Per-source table of pending withdrawals addressed by absolute slot index.
//! Two cursors bound the live window: `withdrawn_length` (first slot not yet
//! paid out) and `unbonding_length` (next free slot). Slots outside the
//! window, and holes left by cancellation, hold nothing.
//!
//! The live count is capped. A request arriving at a full queue is merged
//! into the newest slot instead of being dropped.

use crate::core::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::error::{StakingError, StakingResult};

/// Origin of an unbonding request (observability only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbondType {
    /// Delegator undelegating from a runner
    Undelegation,
    /// Runner withdrawing its own stake
    Unstake,
    /// Runner commission paid out through the queue
    Commission,
    /// Folded into the newest slot because the queue was full
    Merge,
}

/// A pending withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingRequest {
    /// Value awaiting withdrawal
    pub amount: Amount,
    /// When the lock period started (refreshed on merge)
    pub start_time: Timestamp,
    /// Runner the value was unbonded from
    pub runner: Address,
    /// How the slot was last written
    pub unbond_type: UnbondType,
}

/// Where `push` placed a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub index: u64,
    pub unbond_type: UnbondType,
}

/// One source's unbonding requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingQueue {
    slots: BTreeMap<u64, UnbondingRequest>,
    unbonding_length: u64,
    withdrawn_length: u64,
}

impl UnbondingQueue {
    /// Queue with no requests
    pub const EMPTY: Self = Self {
        slots: BTreeMap::new(),
        unbonding_length: 0,
        withdrawn_length: 0,
    };

    /// Next free slot
    pub fn unbonding_length(&self) -> u64 {
        self.unbonding_length
    }

    /// First slot not yet withdrawn
    pub fn withdrawn_length(&self) -> u64 {
        self.withdrawn_length
    }

    /// Number of slots in the live window, holes included
    pub fn live_count(&self) -> u64 {
        self.unbonding_length - self.withdrawn_length
    }

    /// Request at `index`, if it is live and nonempty
    pub fn get(&self, index: u64) -> Option<&UnbondingRequest> {
        self.slots.get(&index)
    }

    /// Live nonempty requests in slot order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &UnbondingRequest)> {
        self.slots.iter().map(|(index, request)| (*index, request))
    }

    /// Sum of live request amounts
    pub fn total_pending(&self) -> Amount {
        self.slots.values().map(|r| r.amount).sum()
    }

    /// Reject a delegator undelegation when fewer than two free slots remain.
    ///
    /// The last slot is reserved so runner unstakes and commission can
    /// always be admitted (by merging if needed).
    pub fn ensure_undelegation_capacity(&self, max_requests: u64) -> StakingResult<()> {
        let live = self.live_count();
        if live >= max_requests.saturating_sub(1) {
            return Err(StakingError::UnbondingQueueFull {
                live,
                max: max_requests,
            });
        }
        Ok(())
    }

    /// Admit a request, merging into the newest slot when the queue is full
    pub fn push(
        &mut self,
        runner: Address,
        amount: Amount,
        now: Timestamp,
        unbond_type: UnbondType,
        max_requests: u64,
    ) -> StakingResult<Admission> {
        if self.live_count() > 0 && self.live_count() >= max_requests {
            let index = self.unbonding_length - 1;
            let slot = self.slots.entry(index).or_insert(UnbondingRequest {
                amount: 0,
                start_time: now,
                runner,
                unbond_type: UnbondType::Merge,
            });
            slot.amount = slot
                .amount
                .checked_add(amount)
                .ok_or(StakingError::AmountOverflow)?;
            slot.start_time = now;
            slot.unbond_type = UnbondType::Merge;
            return Ok(Admission {
                index,
                unbond_type: UnbondType::Merge,
            });
        }

        let index = self.unbonding_length;
        self.slots.insert(
            index,
            UnbondingRequest {
                amount,
                start_time: now,
                runner,
                unbond_type,
            },
        );
        self.unbonding_length += 1;
        Ok(Admission { index, unbond_type })
    }

    /// Consume the head slot. `index` must be the current head.
    ///
    /// Returns the request, or `None` when the head was an empty hole.
    pub fn withdraw_head(&mut self, index: u64) -> StakingResult<Option<UnbondingRequest>> {
        if index != self.withdrawn_length {
            return Err(StakingError::WithdrawOutOfOrder {
                index,
                expected: self.withdrawn_length,
            });
        }
        if index >= self.unbonding_length {
            return Err(StakingError::UnbondingRequestNotFound(index));
        }
        self.withdrawn_length += 1;
        Ok(self.slots.remove(&index))
    }

    /// Delete the slot at `index` and compact whichever end it touched
    pub fn cancel(&mut self, index: u64) -> StakingResult<UnbondingRequest> {
        if index < self.withdrawn_length || index >= self.unbonding_length {
            return Err(StakingError::UnbondingRequestNotFound(index));
        }
        let request = self
            .slots
            .remove(&index)
            .ok_or(StakingError::UnbondingRequestNotFound(index))?;

        if index == self.withdrawn_length {
            while self.withdrawn_length < self.unbonding_length
                && !self.slots.contains_key(&self.withdrawn_length)
            {
                self.withdrawn_length += 1;
            }
        } else if index == self.unbonding_length - 1 {
            while self.unbonding_length > self.withdrawn_length
                && !self.slots.contains_key(&(self.unbonding_length - 1))
            {
                self.unbonding_length -= 1;
            }
        }

        Ok(request)
    }

    /// Take up to `amount` from the oldest slots first.
    ///
    /// Fully consumed slots are deleted and the head advances past them;
    /// a partially consumed slot keeps the rest. Returns what was taken.
    pub fn slash(&mut self, amount: Amount) -> Amount {
        let mut remaining = amount;
        while remaining > 0 && self.withdrawn_length < self.unbonding_length {
            let index = self.withdrawn_length;
            match self.slots.get_mut(&index) {
                Some(slot) if slot.amount > remaining => {
                    slot.amount -= remaining;
                    remaining = 0;
                }
                Some(slot) => {
                    remaining -= slot.amount;
                    self.slots.remove(&index);
                    self.withdrawn_length += 1;
                }
                None => self.withdrawn_length += 1,
            }
        }
        amount - remaining
    }
}
