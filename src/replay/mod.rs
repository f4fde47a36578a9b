//! Scripted replay of staking operations
//!
//! Drives a [`StakingLedger`](crate::staking::StakingLedger) over the
//! in-memory runtime from a JSON configuration and a JSON operation list.
//! Used by the `celereum-staking replay` command.

pub mod config;
pub mod script;

pub use config::LedgerConfig;
pub use script::{load_script, resolve_account, ReplayOp, Replayer};

use thiserror::Error;

use crate::staking::{ParamsError, StakingError, TransferError};

/// Replay errors
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("Mint failed: {0}")]
    Mint(#[from] TransferError),

    #[error("Step {step} failed: {error}")]
    Staking {
        step: usize,
        #[source]
        error: StakingError,
    },
}

impl From<StakingError> for ReplayError {
    fn from(error: StakingError) -> Self {
        Self::Staking { step: 0, error }
    }
}
