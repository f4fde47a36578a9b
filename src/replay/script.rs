//! Replay scripts
//!
//! A script is a JSON array of operations applied in order to a fresh
//! ledger on a [`MemoryHost`]. Accounts are written as labels and resolve
//! through [`resolve_account`], so `"treasury"` names the same address the
//! derived address book uses.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{Address, Amount, Timestamp};
use crate::runtime::MemoryHost;
use crate::staking::{
    CallContext, Role, StakingEvent, StakingLedger, StakingParam, StakingResult, UnbondType,
};
use super::config::LedgerConfig;
use super::ReplayError;

/// Base58 address, or a label hashed with [`Address::derive`]
pub fn resolve_account(label: &str) -> Address {
    label.parse().unwrap_or_else(|_| Address::derive(label))
}

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayOp {
    AdvanceEra,
    SetTime { time: Timestamp },
    Mint { account: String, amount: Amount },
    AddRunner { runner: String },
    RemoveRunner { runner: String },
    Delegate { source: String, runner: String, amount: Amount },
    Undelegate { source: String, runner: String, amount: Amount },
    Unstake { runner: String, amount: Amount },
    Commission { runner: String, amount: Amount },
    Withdraw { source: String },
    WithdrawMatured { source: String },
    Cancel { source: String, index: u64 },
    Slash { runner: String, amount: Amount },
    Reflect { source: String, runner: String },
    SetParam { param: StakingParam, value: u64 },
}

/// Load a script from a JSON file
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<ReplayOp>, ReplayError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Ledger plus host driven by a script
pub struct Replayer {
    ledger: StakingLedger,
    host: MemoryHost,
}

impl Replayer {
    /// Fresh ledger and host for `config`
    pub fn new(config: LedgerConfig) -> Result<Self, ReplayError> {
        let ledger = StakingLedger::new(config.params, config.address_book)?;
        Ok(Self {
            ledger,
            host: MemoryHost::new(config.era_period),
        })
    }

    pub fn ledger(&self) -> &StakingLedger {
        &self.ledger
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Apply every operation in order, stopping at the first failure.
    /// Returns the events emitted.
    pub fn run(&mut self, script: &[ReplayOp]) -> Result<Vec<StakingEvent>, ReplayError> {
        info!("Replaying {} operations", script.len());
        let mut events = Vec::new();
        for (step, op) in script.iter().enumerate() {
            debug!("Step {}: {:?}", step, op);
            self.apply(op).map_err(|error| match error {
                ReplayError::Staking { error, .. } => ReplayError::Staking { step, error },
                other => other,
            })?;
            events.extend(self.ledger.drain_events());
        }
        Ok(events)
    }

    /// Apply a single operation
    pub fn apply(&mut self, op: &ReplayOp) -> Result<(), ReplayError> {
        match op {
            ReplayOp::AdvanceEra => {
                self.host.advance_era();
            }
            ReplayOp::SetTime { time } => self.host.set_time(*time),
            ReplayOp::Mint { account, amount } => {
                self.host.bank.credit(&resolve_account(account), *amount)?;
            }
            _ => self.apply_ledger_op(op).map_err(|error| ReplayError::Staking { step: 0, error })?,
        }
        Ok(())
    }

    fn apply_ledger_op(&mut self, op: &ReplayOp) -> StakingResult<()> {
        let book = self.ledger.address_book().clone();
        let manager = CallContext::as_role(&book, Role::StakingManager);
        let ledger = &mut self.ledger;
        let host = &mut self.host;

        match op {
            ReplayOp::AddRunner { runner } => ledger.add_runner(&manager, resolve_account(runner)),
            ReplayOp::RemoveRunner { runner } => {
                ledger.remove_runner(&manager, &resolve_account(runner))
            }
            ReplayOp::Delegate { source, runner, amount } => ledger.delegate(
                &manager,
                host,
                &resolve_account(source),
                &resolve_account(runner),
                *amount,
            ),
            ReplayOp::Undelegate { source, runner, amount } => ledger
                .start_unbond(
                    &manager,
                    host,
                    &resolve_account(source),
                    &resolve_account(runner),
                    *amount,
                    UnbondType::Undelegation,
                )
                .map(|_| ()),
            ReplayOp::Unstake { runner, amount } => {
                let runner = resolve_account(runner);
                ledger
                    .start_unbond(&manager, host, &runner, &runner, *amount, UnbondType::Unstake)
                    .map(|_| ())
            }
            ReplayOp::Commission { runner, amount } => {
                let distributor = CallContext::as_role(&book, Role::RewardsDistributor);
                ledger
                    .unbond_commission(&distributor, host, &resolve_account(runner), *amount)
                    .map(|_| ())
            }
            ReplayOp::Withdraw { source } => {
                let source = resolve_account(source);
                let head = ledger.unbonding_queue(&source).withdrawn_length();
                ledger.withdraw_a_request(&manager, host, &source, head)
            }
            ReplayOp::WithdrawMatured { source } => {
                let source = resolve_account(source);
                let count = ledger.withdraw_matured(&manager, host, &source)?;
                debug!("Withdrew {} matured slots of {}", count, source);
                Ok(())
            }
            ReplayOp::Cancel { source, index } => {
                ledger.cancel_unbonding(&manager, host, &resolve_account(source), *index)
            }
            ReplayOp::Slash { runner, amount } => {
                ledger.slash_runner(&manager, host, &resolve_account(runner), *amount)
            }
            ReplayOp::Reflect { source, runner } => {
                ledger.reflect_era_update(host, &resolve_account(source), &resolve_account(runner));
                Ok(())
            }
            ReplayOp::SetParam { param, value } => {
                let admin = CallContext::as_role(&book, Role::Admin);
                match param {
                    StakingParam::LeverageLimit => ledger.set_leverage_limit(&admin, *value),
                    StakingParam::MaxUnbondingRequests => {
                        ledger.set_max_unbonding_requests(&admin, *value)
                    }
                    StakingParam::LockPeriod => ledger.set_lock_period(&admin, *value),
                    StakingParam::UnbondFeeRate => ledger.set_unbond_fee_rate(&admin, *value),
                }
            }
            ReplayOp::AdvanceEra | ReplayOp::SetTime { .. } | ReplayOp::Mint { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::{check_invariants, StakingError, StakingParams};

    const SCRIPT: &str = r#"[
        { "op": "mint", "account": "runner", "amount": 10000 },
        { "op": "mint", "account": "alice", "amount": 5000 },
        { "op": "add_runner", "runner": "runner" },
        { "op": "delegate", "source": "runner", "runner": "runner", "amount": 1000 },
        { "op": "advance_era" },
        { "op": "delegate", "source": "alice", "runner": "runner", "amount": 500 },
        { "op": "undelegate", "source": "alice", "runner": "runner", "amount": 200 },
        { "op": "set_time", "time": 700000 },
        { "op": "withdraw_matured", "source": "alice" },
        { "op": "slash", "runner": "runner", "amount": 100 }
    ]"#;

    #[test]
    fn test_replay_script() {
        let script: Vec<ReplayOp> = serde_json::from_str(SCRIPT).unwrap();
        let mut replayer = Replayer::new(LedgerConfig::default()).unwrap();
        let events = replayer.run(&script).unwrap();

        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], StakingEvent::DelegationAdded { amount: 1000, .. }));
        assert!(matches!(events[4], StakingEvent::UnbondWithdrawn { amount: 200, fee: 0, .. }));
        assert!(matches!(events[5], StakingEvent::RunnerSlashed { from_stake: 100, .. }));

        let alice = resolve_account("alice");
        let ledger = replayer.ledger();
        assert_eq!(ledger.after_delegation_amount(&alice, &resolve_account("runner")), 300);
        assert_eq!(replayer.host().bank.balance(&alice), 4_700);
        check_invariants(ledger.state(), ledger.params().max_unbonding_requests).unwrap();
    }

    #[test]
    fn test_failure_reports_step() {
        let script = vec![
            ReplayOp::AddRunner { runner: "runner".into() },
            ReplayOp::Slash { runner: "runner".into(), amount: 1 },
        ];
        let mut replayer = Replayer::new(LedgerConfig::default()).unwrap();
        let err = replayer.run(&script).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Staking { step: 1, error: StakingError::SlashExceedsAvailable { requested: 1 } }
        ));
    }

    #[test]
    fn test_set_param_uses_admin() {
        let mut replayer = Replayer::new(LedgerConfig::default()).unwrap();
        replayer
            .apply(&ReplayOp::SetParam { param: StakingParam::LockPeriod, value: 60 })
            .unwrap();
        assert_eq!(replayer.ledger().params().lock_period, 60);
        assert_ne!(replayer.ledger().params(), &StakingParams::default());
    }

    #[test]
    fn test_resolve_account() {
        let alice = Address::derive("alice");
        assert_eq!(resolve_account("alice"), alice);
        assert_eq!(resolve_account(&alice.to_base58()), alice);
    }
}
