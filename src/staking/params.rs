//! Staking parameters
//!
//! Administrator-controlled knobs. Every change made through the ledger
//! emits a `ParameterChanged` event.

use crate::core::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Denominator for the unbond fee rate (parts per million)
pub const PER_MILL: u64 = 1_000_000;

/// Default leverage limit (total stake may reach 10x the runner's own stake)
pub const DEFAULT_LEVERAGE_LIMIT: u64 = 10;

/// Default cap on live unbonding requests per source
pub const DEFAULT_MAX_UNBONDING_REQUESTS: u64 = 20;

/// Default lock period (7 days)
pub const DEFAULT_LOCK_PERIOD: Timestamp = 7 * 24 * 60 * 60;

/// Default unbond fee (0.1%)
pub const DEFAULT_UNBOND_FEE_RATE: u64 = 1_000;

/// Staking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingParams {
    /// Maximum ratio of total runner stake to the runner's own stake
    pub leverage_limit: u64,
    /// Maximum live unbonding requests per source
    pub max_unbonding_requests: u64,
    /// Seconds a request must wait before it may be paid out
    pub lock_period: Timestamp,
    /// Fee taken on withdrawal, in parts per million (must be < 100%)
    pub unbond_fee_rate: u64,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            leverage_limit: DEFAULT_LEVERAGE_LIMIT,
            max_unbonding_requests: DEFAULT_MAX_UNBONDING_REQUESTS,
            lock_period: DEFAULT_LOCK_PERIOD,
            unbond_fee_rate: DEFAULT_UNBOND_FEE_RATE,
        }
    }
}

impl StakingParams {
    /// Check every parameter is within range
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.leverage_limit == 0 {
            return Err(ParamsError::ZeroLeverageLimit);
        }
        if self.max_unbonding_requests == 0 {
            return Err(ParamsError::ZeroMaxUnbondingRequests);
        }
        if self.unbond_fee_rate >= PER_MILL {
            return Err(ParamsError::FeeRateTooHigh(self.unbond_fee_rate));
        }
        Ok(())
    }

    /// Fee charged when withdrawing `amount`
    pub fn unbond_fee(&self, amount: Amount) -> Amount {
        (amount as u128 * self.unbond_fee_rate as u128 / PER_MILL as u128) as Amount
    }
}

/// Parameter identifiers carried by `ParameterChanged` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingParam {
    LeverageLimit,
    MaxUnbondingRequests,
    LockPeriod,
    UnbondFeeRate,
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    #[error("Leverage limit must be at least 1")]
    ZeroLeverageLimit,

    #[error("Max unbonding requests must be at least 1")]
    ZeroMaxUnbondingRequests,

    #[error("Unbond fee rate {0} must be below 1000000 (100%)")]
    FeeRateTooHigh(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = StakingParams::default();
        assert_eq!(params.leverage_limit, 10);
        assert_eq!(params.max_unbonding_requests, 20);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_fee_rate_must_be_below_full() {
        let params = StakingParams {
            unbond_fee_rate: PER_MILL,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::FeeRateTooHigh(PER_MILL)));
    }

    #[test]
    fn test_unbond_fee() {
        let params = StakingParams::default();
        // 0.1% of 1_000_000
        assert_eq!(params.unbond_fee(1_000_000), 1_000);
        assert_eq!(params.unbond_fee(999), 0);

        let free = StakingParams { unbond_fee_rate: 0, ..Default::default() };
        assert_eq!(free.unbond_fee(u64::MAX), 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: StakingParams = serde_json::from_str(r#"{"leverage_limit": 3}"#).unwrap();
        assert_eq!(params.leverage_limit, 3);
        assert_eq!(params.max_unbonding_requests, DEFAULT_MAX_UNBONDING_REQUESTS);
    }
}
