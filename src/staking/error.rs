//! Staking ledger errors
//!
//! Every error aborts the entry point that raised it with no state change.

use crate::core::{Address, Amount};
use super::host::TransferError;
use super::params::ParamsError;

/// Broad classification of a [`StakingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the role required by the entry point
    Permission,
    /// Malformed or out-of-range request
    Validation,
    /// Unbonding queue admission control
    Capacity,
    /// Leverage or first-stake rule violated
    Economic,
    /// Value-transfer service rejected the settlement
    Transfer,
}

/// Staking errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StakingError {
    #[error("Caller {0} is not the staking manager")]
    NotManager(Address),

    #[error("Caller {0} is neither the staking manager nor the ledger")]
    NotManagerOrLedger(Address),

    #[error("Caller {0} is not the staking admin")]
    NotAdmin(Address),

    #[error("Caller {0} is not the rewards distributor")]
    NotRewardsDistributor(Address),

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Amount {requested} exceeds delegated value {available}")]
    InsufficientDelegation { requested: Amount, available: Amount },

    #[error("Withdrawal index {index} is out of order (next is {expected})")]
    WithdrawOutOfOrder { index: u64, expected: u64 },

    #[error("No live unbonding request at index {0}")]
    UnbondingRequestNotFound(u64),

    #[error("Slash of {requested} exceeds available runner value")]
    SlashExceedsAvailable { requested: Amount },

    #[error("Locked amount of {account} cannot cover {amount}")]
    LockedAmountUnderflow { account: Address, amount: Amount },

    #[error("Arithmetic overflow")]
    AmountOverflow,

    #[error("Runner {0} is already registered")]
    RunnerAlreadyRegistered(Address),

    #[error("Runner {0} is not registered")]
    RunnerNotRegistered(Address),

    #[error("Unbonding queue full ({live} live requests, max {max})")]
    UnbondingQueueFull { live: u64, max: u64 },

    #[error("Cap of {max} unbonding requests is below a queue holding {live}")]
    MaxBelowLiveRequests { max: u64, live: u64 },

    #[error("Delegation of {amount} to {runner} exceeds leverage limit")]
    LeverageLimitExceeded { runner: Address, amount: Amount },

    #[error("First stake of runner {runner} must come from the runner itself, not {delegator}")]
    FirstStakeNotFromRunner { delegator: Address, runner: Address },

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamsError),
}

impl StakingError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotManager(_)
            | Self::NotManagerOrLedger(_)
            | Self::NotAdmin(_)
            | Self::NotRewardsDistributor(_) => ErrorKind::Permission,
            Self::UnbondingQueueFull { .. } => ErrorKind::Capacity,
            Self::LeverageLimitExceeded { .. } | Self::FirstStakeNotFromRunner { .. } => {
                ErrorKind::Economic
            }
            Self::Transfer(_) => ErrorKind::Transfer,
            Self::ZeroAmount
            | Self::InsufficientDelegation { .. }
            | Self::WithdrawOutOfOrder { .. }
            | Self::UnbondingRequestNotFound(_)
            | Self::SlashExceedsAvailable { .. }
            | Self::LockedAmountUnderflow { .. }
            | Self::AmountOverflow
            | Self::RunnerAlreadyRegistered(_)
            | Self::RunnerNotRegistered(_)
            | Self::MaxBelowLiveRequests { .. }
            | Self::Params(_) => ErrorKind::Validation,
        }
    }
}

/// Result alias for ledger operations
pub type StakingResult<T> = Result<T, StakingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let who = Address::derive("mallory");
        assert_eq!(StakingError::NotManager(who).kind(), ErrorKind::Permission);
        assert_eq!(StakingError::ZeroAmount.kind(), ErrorKind::Validation);
        assert_eq!(
            StakingError::UnbondingQueueFull { live: 19, max: 20 }.kind(),
            ErrorKind::Capacity
        );
        assert_eq!(
            StakingError::LeverageLimitExceeded { runner: who, amount: 1 }.kind(),
            ErrorKind::Economic
        );
    }
}
