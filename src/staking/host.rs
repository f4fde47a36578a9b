//! Collaborator interfaces consumed by the ledger
//!
//! The ledger never owns the token, the era counter or the reward engine.
//! It reaches them through these traits, bundled into [`StakingHost`] and
//! passed by mutable reference into every entry point.

use crate::core::{Address, Amount, EraId, Timestamp};
use serde::{Deserialize, Serialize};

/// One debit/credit leg of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Account debited
    pub from: Address,
    /// Account credited
    pub to: Address,
    /// Amount moved
    pub amount: Amount,
}

impl Transfer {
    /// Create a transfer leg
    pub fn new(from: Address, to: Address, amount: Amount) -> Self {
        Self { from, to, amount }
    }
}

/// Value-transfer failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Insufficient balance in {account}: has {balance}, needs {required}")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        required: Amount,
    },

    #[error("Balance overflow crediting {0}")]
    Overflow(Address),
}

/// Value-transfer service
pub trait ValueTransfer {
    /// Apply every leg or none of them.
    ///
    /// Covers both `transfer` (the ledger escrow is `from`) and
    /// `transferFrom` (a participant is `from`).
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), TransferError>;
}

/// Era sequencer
pub trait EraClock {
    /// Advance the era counter if its boundary has passed and return the
    /// current era
    fn advance_and_get_current_era(&mut self) -> EraId;
}

/// Reward engine notification sink
pub trait RewardEngine {
    /// Stake between `source` and `runner` changed
    fn on_stake_change(&mut self, runner: &Address, source: &Address);
}

/// Everything the ledger needs from its environment
pub trait StakingHost: ValueTransfer + EraClock + RewardEngine {
    /// Current block time
    fn now(&self) -> Timestamp;
}
