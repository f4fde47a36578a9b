//! In-memory host for the staking ledger
//!
//! Bundles a [`TokenBank`], an era clock driven by block time and a log of
//! the stake-change notifications the reward engine would receive.

use crate::core::{Address, EraId, Timestamp};
use crate::staking::{
    EraClock, RewardEngine, StakingHost, Transfer, TransferError, ValueTransfer,
};
use super::bank::TokenBank;

/// Default era length (1 day)
pub const DEFAULT_ERA_PERIOD: Timestamp = 24 * 60 * 60;

/// Host backed by in-memory state
#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub bank: TokenBank,
    era: EraId,
    era_start: Timestamp,
    era_period: Timestamp,
    now: Timestamp,
    /// `(runner, source)` pairs passed to the reward engine
    stake_changes: Vec<(Address, Address)>,
}

impl MemoryHost {
    /// Create a host at era 1, time 0
    pub fn new(era_period: Timestamp) -> Self {
        Self {
            bank: TokenBank::new(),
            era: 1,
            era_start: 0,
            era_period: era_period.max(1),
            now: 0,
            stake_changes: Vec::new(),
        }
    }

    /// Current block time
    pub fn time(&self) -> Timestamp {
        self.now
    }

    /// Move block time forward. Eras advance lazily on the next read.
    pub fn set_time(&mut self, now: Timestamp) {
        self.now = self.now.max(now);
    }

    /// Move block time forward by `seconds`
    pub fn advance_time(&mut self, seconds: Timestamp) {
        self.now = self.now.saturating_add(seconds);
    }

    /// Start the next era immediately
    pub fn advance_era(&mut self) -> EraId {
        self.era += 1;
        self.era_start = self.now;
        self.era
    }

    /// Era as last advanced, without checking the clock
    pub fn era(&self) -> EraId {
        self.era
    }

    /// Stake-change notifications received so far
    pub fn stake_changes(&self) -> &[(Address, Address)] {
        &self.stake_changes
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(DEFAULT_ERA_PERIOD)
    }
}

impl ValueTransfer for MemoryHost {
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), TransferError> {
        self.bank.settle(transfers)
    }
}

impl EraClock for MemoryHost {
    fn advance_and_get_current_era(&mut self) -> EraId {
        while let Some(next_start) = self.era_start.checked_add(self.era_period) {
            if self.now < next_start {
                break;
            }
            self.era += 1;
            self.era_start = next_start;
        }
        self.era
    }
}

impl RewardEngine for MemoryHost {
    fn on_stake_change(&mut self, runner: &Address, source: &Address) {
        self.stake_changes.push((*runner, *source));
    }
}

impl StakingHost for MemoryHost {
    fn now(&self) -> Timestamp {
        self.now
    }
}
