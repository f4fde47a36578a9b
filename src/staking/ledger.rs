//! Staking Ledger
//!
//! Owns all staking state and exposes the entry points used by the staking
//! manager, the reward engine and the administrator.
//!
//! Every entry point runs in three phases: check the caller, stage the
//! change against copies of the cells and queues it touches, then settle any
//! value transfer and write the staged state back. A failure in either of
//! the first two phases, or a rejected settlement, leaves the ledger
//! untouched and emits nothing.

use crate::core::{Address, Amount, EraId, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::access::{AddressBook, CallContext};
use super::deferred::DeferredValue;
use super::delegation::{DelegationChange, DelegationTable};
use super::error::{StakingError, StakingResult};
use super::events::StakingEvent;
use super::host::{StakingHost, Transfer};
use super::params::{StakingParam, StakingParams};
use super::registry::RunnerRegistry;
use super::slashing::SlashPlan;
use super::unbonding::{Admission, UnbondType, UnbondingQueue, UnbondingRequest};

/// Bounded on-ledger state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub delegations: DelegationTable,
    pub unbonding: HashMap<Address, UnbondingQueue>,
    pub locked: HashMap<Address, Amount>,
    pub runners: RunnerRegistry,
}

/// Encoded ledger checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub state: LedgerState,
    pub params: StakingParams,
    pub address_book: AddressBook,
}

/// Staged unbonding request
struct UnbondPlan {
    source: Address,
    runner: Address,
    amount: Amount,
    queue: UnbondingQueue,
    admission: Admission,
    removal: Option<DelegationChange>,
    locked: Amount,
}

/// Staged head withdrawal
struct WithdrawPlan {
    index: u64,
    request: Option<UnbondingRequest>,
    fee: Amount,
}

/// Ledger shared between callers; the mutex serializes entry points
pub type SharedStakingLedger = Arc<Mutex<StakingLedger>>;

/// Era-indexed staking ledger
#[derive(Debug, Clone)]
pub struct StakingLedger {
    state: LedgerState,
    params: StakingParams,
    address_book: AddressBook,
    events: Vec<StakingEvent>,
}

impl StakingLedger {
    /// Create an empty ledger
    pub fn new(params: StakingParams, address_book: AddressBook) -> StakingResult<Self> {
        params.validate()?;
        Ok(Self {
            state: LedgerState::default(),
            params,
            address_book,
            events: Vec::new(),
        })
    }

    /// Wrap the ledger for use from several threads
    pub fn into_shared(self) -> SharedStakingLedger {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // ERA RECONCILIATION
    // =========================================================================

    /// Bring the `(source, runner)` delegation cell and the runner total up
    /// to the current era. Callable by anyone; idempotent.
    pub fn reflect_era_update<H: StakingHost>(
        &mut self,
        host: &mut H,
        source: &Address,
        runner: &Address,
    ) -> EraId {
        let era = host.advance_and_get_current_era();
        self.state.delegations.reflect_era_update(source, runner, era);
        era
    }

    // =========================================================================
    // RUNNER REGISTRY
    // =========================================================================

    /// Register a runner
    pub fn add_runner(&mut self, ctx: &CallContext, runner: Address) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        self.state.runners.add(runner)?;
        info!("Runner registered: {} ({} active)", runner, self.state.runners.len());
        Ok(())
    }

    /// Deregister a runner
    pub fn remove_runner(&mut self, ctx: &CallContext, runner: &Address) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        self.state.runners.remove(runner)?;
        info!("Runner removed: {} ({} active)", runner, self.state.runners.len());
        Ok(())
    }

    // =========================================================================
    // DELEGATION
    // =========================================================================

    /// Reject a delegation that would push the runner's total stake beyond
    /// `leverage_limit` times its own stake.
    ///
    /// Not enforced by [`add_delegation`](Self::add_delegation); the
    /// delegation entry point for outside callers is [`delegate`](Self::delegate).
    pub fn check_delegate_limitation(
        &self,
        ctx: &CallContext,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        self.leverage_check(runner, amount)
    }

    /// Add `amount` to the delegation from `source` to `runner`
    pub fn add_delegation<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager_or_ledger(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let change = self.state.delegations.plan_add(source, runner, amount, era)?;
        let locked = self.locked_plus(source, amount)?;
        self.commit_delegation_added(host, change, amount, locked);
        Ok(())
    }

    /// Remove `amount` from the delegation from `source` to `runner`; the
    /// decrease settles at the next era boundary
    pub fn remove_delegation<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager_or_ledger(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let change = self.state.delegations.plan_remove(source, runner, amount, era)?;
        self.commit_delegation_removed(host, change, amount);
        Ok(())
    }

    /// Pull `amount` from `source` into the ledger escrow
    pub fn transfer_delegation_tokens<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        host.settle(&[Transfer::new(*source, self.address_book.escrow, amount)])?;
        debug!("Escrowed {} from {}", amount, source);
        Ok(())
    }

    /// Stake `amount` from `source` on a registered runner: leverage check,
    /// token pull and delegation as one operation.
    ///
    /// A runner staking on itself is not subject to the leverage check.
    pub fn delegate<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        if !self.state.runners.contains(runner) {
            return Err(StakingError::RunnerNotRegistered(*runner));
        }
        if source != runner {
            self.leverage_check(runner, amount)?;
        }
        let era = host.advance_and_get_current_era();
        let change = self.state.delegations.plan_add(source, runner, amount, era)?;
        let locked = self.locked_plus(source, amount)?;

        host.settle(&[Transfer::new(*source, self.address_book.escrow, amount)])?;
        self.commit_delegation_added(host, change, amount, locked);
        Ok(())
    }

    // =========================================================================
    // UNBONDING
    // =========================================================================

    /// Queue `amount` for withdrawal.
    ///
    /// Undelegations are rejected once fewer than two slots remain; other
    /// types merge into the newest slot when the queue is full. Except for
    /// commission, the amount is first removed from the delegation.
    /// Returns the slot the request landed in.
    pub fn start_unbond<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        runner: &Address,
        amount: Amount,
        unbond_type: UnbondType,
    ) -> StakingResult<u64> {
        ctx.ensure_manager_or_ledger(&self.address_book)?;
        let plan = self.plan_unbond(host, source, runner, amount, unbond_type)?;
        Ok(self.commit_unbond(host, plan))
    }

    /// Move runner commission from the reward engine into the runner's
    /// unbonding queue
    pub fn unbond_commission<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<u64> {
        ctx.ensure_rewards_distributor(&self.address_book)?;
        let plan = self.plan_unbond(host, runner, runner, amount, UnbondType::Commission)?;
        host.settle(&[Transfer::new(ctx.caller, self.address_book.escrow, amount)])?;
        Ok(self.commit_unbond(host, plan))
    }

    /// Pay out the head request of `source`'s queue, minus the unbond fee.
    ///
    /// `index` must be the current head. The lock period is not checked
    /// here; see [`withdraw_matured`](Self::withdraw_matured).
    pub fn withdraw_a_request<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        index: u64,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let mut queue = self.queue(source).clone();
        let plan = self.plan_withdraw(&mut queue, index)?;
        let locked = self.locked_minus(source, plan.request.map_or(0, |r| r.amount))?;

        let transfers = self.payout_transfers(source, plan.request.map_or(0, |r| r.amount), plan.fee);
        host.settle(&transfers)?;

        self.state.unbonding.insert(*source, queue);
        self.state.locked.insert(*source, locked);
        self.reflect_withdrawn(source, &plan, era);
        self.emit_withdrawn(source, &plan);
        Ok(())
    }

    /// Withdraw every head request of `source` whose lock period has
    /// elapsed, stopping at the first one still locked.
    ///
    /// All payouts settle in one batch. Returns the number of slots
    /// consumed.
    pub fn withdraw_matured<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
    ) -> StakingResult<usize> {
        ctx.ensure_manager(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let now = host.now();
        let mut queue = self.queue(source).clone();
        let mut plans = Vec::new();

        while queue.live_count() > 0 {
            let head = queue.withdrawn_length();
            if let Some(request) = queue.get(head) {
                if !self.is_matured(request, now) {
                    break;
                }
            }
            plans.push(self.plan_withdraw(&mut queue, head)?);
        }

        let total: Amount = plans
            .iter()
            .filter_map(|p| p.request.map(|r| r.amount))
            .try_fold(0u64, |acc, a| acc.checked_add(a))
            .ok_or(StakingError::AmountOverflow)?;
        let fees: Amount = plans.iter().map(|p| p.fee).sum();
        let locked = self.locked_minus(source, total)?;

        host.settle(&self.payout_transfers(source, total, fees))?;

        self.state.unbonding.insert(*source, queue);
        self.state.locked.insert(*source, locked);
        for plan in &plans {
            self.reflect_withdrawn(source, plan, era);
            self.emit_withdrawn(source, plan);
        }
        Ok(plans.len())
    }

    /// Delete a live unbonding request without paying it out.
    ///
    /// The value leaves `source`'s locked amount; returning it to a
    /// delegation is the caller's job (see
    /// [`cancel_unbonding`](Self::cancel_unbonding)).
    pub fn remove_unbonding_amount(
        &mut self,
        ctx: &CallContext,
        source: &Address,
        index: u64,
    ) -> StakingResult<UnbondingRequest> {
        ctx.ensure_manager(&self.address_book)?;
        let mut queue = self.queue(source).clone();
        let request = queue.cancel(index)?;
        let locked = self.locked_minus(source, request.amount)?;

        self.state.unbonding.insert(*source, queue);
        self.state.locked.insert(*source, locked);
        self.emit_cancelled(source, &request, index);
        Ok(request)
    }

    /// Cancel a live unbonding request and delegate its value back to the
    /// runner it came from
    pub fn cancel_unbonding<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        source: &Address,
        index: u64,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let mut queue = self.queue(source).clone();
        let request = queue.cancel(index)?;
        if !self.state.runners.contains(&request.runner) {
            return Err(StakingError::RunnerNotRegistered(request.runner));
        }
        let change = self
            .state
            .delegations
            .plan_add(source, &request.runner, request.amount, era)?;
        let locked = self.locked(source);

        self.state.unbonding.insert(*source, queue);
        self.emit_cancelled(source, &request, index);
        self.commit_delegation_added(host, change, request.amount, locked);
        Ok(())
    }

    // =========================================================================
    // SLASHING
    // =========================================================================

    /// Take `amount` from `runner`: its unbonding queue first, then its
    /// self-stake. The full amount goes to the penalty receiver.
    pub fn slash_runner<H: StakingHost>(
        &mut self,
        ctx: &CallContext,
        host: &mut H,
        runner: &Address,
        amount: Amount,
    ) -> StakingResult<()> {
        ctx.ensure_manager(&self.address_book)?;
        let era = host.advance_and_get_current_era();
        let plan = SlashPlan::build(self.queue(runner), &self.state.delegations, runner, amount, era)?;
        let locked = self.locked_minus(runner, amount)?;

        host.settle(&[Transfer::new(
            self.address_book.escrow,
            self.address_book.penalty_receiver,
            amount,
        )])?;

        self.state.unbonding.insert(*runner, plan.queue);
        self.state.locked.insert(*runner, locked);
        if let Some(change) = plan.stake_change {
            self.state.delegations.apply(change);
        }
        host.on_stake_change(runner, runner);

        warn!(
            "Runner {} slashed {} ({} from unbonding, {} from stake)",
            runner, amount, plan.from_queue, plan.from_stake
        );
        self.events.push(StakingEvent::RunnerSlashed {
            runner: *runner,
            amount,
            from_queue: plan.from_queue,
            from_stake: plan.from_stake,
        });
        Ok(())
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Set the leverage limit
    pub fn set_leverage_limit(&mut self, ctx: &CallContext, value: u64) -> StakingResult<()> {
        self.update_param(ctx, StakingParam::LeverageLimit, value, |p| {
            p.leverage_limit = value
        })
    }

    /// Set the cap on live unbonding requests per source
    ///
    /// Rejected while any source holds more live slots than `value`.
    pub fn set_max_unbonding_requests(&mut self, ctx: &CallContext, value: u64) -> StakingResult<()> {
        ctx.ensure_admin(&self.address_book)?;
        let live = self
            .state
            .unbonding
            .values()
            .map(UnbondingQueue::live_count)
            .max()
            .unwrap_or(0);
        if value < live {
            return Err(StakingError::MaxBelowLiveRequests { max: value, live });
        }
        self.update_param(ctx, StakingParam::MaxUnbondingRequests, value, |p| {
            p.max_unbonding_requests = value
        })
    }

    /// Set the lock period in seconds
    pub fn set_lock_period(&mut self, ctx: &CallContext, value: Timestamp) -> StakingResult<()> {
        self.update_param(ctx, StakingParam::LockPeriod, value, |p| p.lock_period = value)
    }

    /// Set the unbond fee rate (parts per million)
    pub fn set_unbond_fee_rate(&mut self, ctx: &CallContext, value: u64) -> StakingResult<()> {
        self.update_param(ctx, StakingParam::UnbondFeeRate, value, |p| {
            p.unbond_fee_rate = value
        })
    }

    fn update_param(
        &mut self,
        ctx: &CallContext,
        param: StakingParam,
        value: u64,
        update: impl FnOnce(&mut StakingParams),
    ) -> StakingResult<()> {
        ctx.ensure_admin(&self.address_book)?;
        let mut params = self.params.clone();
        update(&mut params);
        params.validate()?;
        self.params = params;

        info!("Staking parameter {:?} set to {}", param, value);
        self.events.push(StakingEvent::ParameterChanged { param, value });
        Ok(())
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// True when the stored delegation cell holds no current or pending value
    pub fn is_empty_delegation(&self, source: &Address, runner: &Address) -> bool {
        self.state.delegations.delegation(source, runner).is_empty()
    }

    /// Stored delegation cell
    pub fn delegation(&self, source: &Address, runner: &Address) -> DeferredValue {
        self.state.delegations.delegation(source, runner)
    }

    /// Delegation cell as of `era`
    pub fn delegation_at(&self, source: &Address, runner: &Address, era: EraId) -> DeferredValue {
        self.delegation(source, runner).reconciled(era)
    }

    /// Stored runner total cell
    pub fn runner_total(&self, runner: &Address) -> DeferredValue {
        self.state.delegations.total(runner)
    }

    /// Runner total as of `era`
    pub fn runner_total_at(&self, runner: &Address, era: EraId) -> DeferredValue {
        self.runner_total(runner).reconciled(era)
    }

    /// Value `source` has delegated to `runner` in the stored era
    pub fn delegation_amount(&self, source: &Address, runner: &Address) -> Amount {
        self.delegation(source, runner).value_at
    }

    /// Value `source` will have delegated to `runner` once pending changes settle
    pub fn after_delegation_amount(&self, source: &Address, runner: &Address) -> Amount {
        self.delegation(source, runner).value_after
    }

    /// Total stake of `runner` in the stored era
    pub fn total_staking_amount(&self, runner: &Address) -> Amount {
        self.runner_total(runner).value_at
    }

    /// Value delegated plus value waiting in the unbonding queue
    pub fn locked_amount(&self, source: &Address) -> Amount {
        self.locked(source)
    }

    /// Runners `source` has delegated to
    pub fn staking_index(&self, source: &Address) -> &[Address] {
        self.state.delegations.staking_index(source)
    }

    /// Unbonding queue of `source`
    pub fn unbonding_queue(&self, source: &Address) -> &UnbondingQueue {
        self.queue(source)
    }

    /// Live request at `index`
    pub fn unbonding_request(&self, source: &Address, index: u64) -> Option<&UnbondingRequest> {
        self.queue(source).get(index)
    }

    /// Registered runners
    pub fn runners(&self) -> &RunnerRegistry {
        &self.state.runners
    }

    /// Check if `runner` is registered
    pub fn is_runner(&self, runner: &Address) -> bool {
        self.state.runners.contains(runner)
    }

    pub fn runner_count(&self) -> usize {
        self.state.runners.len()
    }

    /// Runner in registry slot `slot`
    pub fn runner_at(&self, slot: usize) -> Option<&Address> {
        self.state.runners.get(slot)
    }

    /// Current parameters
    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    /// Role addresses
    pub fn address_book(&self) -> &AddressBook {
        &self.address_book
    }

    /// Full state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Events emitted so far
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Take the emitted events, leaving the log empty
    pub fn drain_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Encode state, parameters and roles
    pub fn snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(&LedgerSnapshot {
            state: self.state.clone(),
            params: self.params.clone(),
            address_book: self.address_book.clone(),
        })
    }

    /// Rebuild a ledger from [`snapshot`](Self::snapshot) bytes
    pub fn restore(data: &[u8]) -> Result<Self, bincode::Error> {
        let snapshot: LedgerSnapshot = bincode::deserialize(data)?;
        Ok(Self {
            state: snapshot.state,
            params: snapshot.params,
            address_book: snapshot.address_book,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn queue(&self, source: &Address) -> &UnbondingQueue {
        static EMPTY: UnbondingQueue = UnbondingQueue::EMPTY;
        self.state.unbonding.get(source).unwrap_or(&EMPTY)
    }

    fn locked(&self, source: &Address) -> Amount {
        self.state.locked.get(source).copied().unwrap_or(0)
    }

    fn locked_plus(&self, source: &Address, amount: Amount) -> StakingResult<Amount> {
        self.locked(source)
            .checked_add(amount)
            .ok_or(StakingError::AmountOverflow)
    }

    fn locked_minus(&self, source: &Address, amount: Amount) -> StakingResult<Amount> {
        self.locked(source)
            .checked_sub(amount)
            .ok_or(StakingError::LockedAmountUnderflow {
                account: *source,
                amount,
            })
    }

    fn leverage_check(&self, runner: &Address, amount: Amount) -> StakingResult<()> {
        let self_stake = self.state.delegations.delegation(runner, runner).value_after as u128;
        let total = self.state.delegations.total(runner).value_after as u128;
        if self_stake * (self.params.leverage_limit as u128) < total + amount as u128 {
            return Err(StakingError::LeverageLimitExceeded {
                runner: *runner,
                amount,
            });
        }
        Ok(())
    }

    fn is_matured(&self, request: &UnbondingRequest, now: Timestamp) -> bool {
        request.start_time.saturating_add(self.params.lock_period) <= now
    }

    fn plan_unbond<H: StakingHost>(
        &self,
        host: &mut H,
        source: &Address,
        runner: &Address,
        amount: Amount,
        unbond_type: UnbondType,
    ) -> StakingResult<UnbondPlan> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let max = self.params.max_unbonding_requests;
        let mut queue = self.queue(source).clone();
        if unbond_type == UnbondType::Undelegation {
            queue.ensure_undelegation_capacity(max)?;
        }

        let era = host.advance_and_get_current_era();
        let (removal, locked) = if unbond_type == UnbondType::Commission {
            (None, self.locked_plus(source, amount)?)
        } else {
            let change = self.state.delegations.plan_remove(source, runner, amount, era)?;
            (Some(change), self.locked(source))
        };

        let admission = queue.push(*runner, amount, host.now(), unbond_type, max)?;
        Ok(UnbondPlan {
            source: *source,
            runner: *runner,
            amount,
            queue,
            admission,
            removal,
            locked,
        })
    }

    fn commit_unbond<H: StakingHost>(&mut self, host: &mut H, plan: UnbondPlan) -> u64 {
        if let Some(change) = plan.removal {
            self.commit_delegation_removed(host, change, plan.amount);
        }
        self.state.unbonding.insert(plan.source, plan.queue);
        self.state.locked.insert(plan.source, plan.locked);

        debug!(
            "Unbond requested: {} from {} by {} at slot {} ({:?})",
            plan.amount, plan.runner, plan.source, plan.admission.index, plan.admission.unbond_type
        );
        self.events.push(StakingEvent::UnbondRequested {
            source: plan.source,
            runner: plan.runner,
            amount: plan.amount,
            index: plan.admission.index,
            unbond_type: plan.admission.unbond_type,
        });
        plan.admission.index
    }

    fn plan_withdraw(&self, queue: &mut UnbondingQueue, index: u64) -> StakingResult<WithdrawPlan> {
        let request = queue.withdraw_head(index)?;
        let fee = request.map_or(0, |r| self.params.unbond_fee(r.amount));
        Ok(WithdrawPlan { index, request, fee })
    }

    /// Fee to the treasury and the rest to the source, zero legs dropped
    fn payout_transfers(&self, source: &Address, amount: Amount, fee: Amount) -> Vec<Transfer> {
        let escrow = self.address_book.escrow;
        [
            Transfer::new(escrow, self.address_book.treasury, fee),
            Transfer::new(escrow, *source, amount - fee),
        ]
        .into_iter()
        .filter(|t| t.amount > 0)
        .collect()
    }

    fn commit_delegation_added<H: StakingHost>(
        &mut self,
        host: &mut H,
        change: DelegationChange,
        amount: Amount,
        locked: Amount,
    ) {
        let (source, runner) = (change.source, change.runner);
        self.state.delegations.apply(change);
        self.state.locked.insert(source, locked);
        host.on_stake_change(&runner, &source);

        debug!("Delegation added: {} from {} to {}", amount, source, runner);
        self.events.push(StakingEvent::DelegationAdded { source, runner, amount });
    }

    fn commit_delegation_removed<H: StakingHost>(
        &mut self,
        host: &mut H,
        change: DelegationChange,
        amount: Amount,
    ) {
        let (source, runner) = (change.source, change.runner);
        self.state.delegations.apply(change);
        host.on_stake_change(&runner, &source);

        debug!("Delegation removed: {} from {} to {}", amount, source, runner);
        self.events.push(StakingEvent::DelegationRemoved { source, runner, amount });
    }

    /// Bring the delegation a paid-out request came from up to `era`, so a
    /// completed exit drops out of the staking index
    fn reflect_withdrawn(&mut self, source: &Address, plan: &WithdrawPlan, era: EraId) {
        if let Some(request) = plan.request {
            self.state
                .delegations
                .reflect_era_update(source, &request.runner, era);
        }
    }

    fn emit_withdrawn(&mut self, source: &Address, plan: &WithdrawPlan) {
        if let Some(request) = plan.request {
            debug!("Unbond withdrawn: slot {} of {} ({} fee)", plan.index, source, plan.fee);
            self.events.push(StakingEvent::UnbondWithdrawn {
                source: *source,
                amount: request.amount - plan.fee,
                fee: plan.fee,
                index: plan.index,
            });
        }
    }

    fn emit_cancelled(&mut self, source: &Address, request: &UnbondingRequest, index: u64) {
        debug!("Unbond cancelled: slot {} of {} ({})", index, source, request.amount);
        self.events.push(StakingEvent::UnbondCancelled {
            source: *source,
            runner: request.runner,
            amount: request.amount,
            index,
        });
    }
}
