//! Named-address registry and caller gates
//!
//! Resolves logical roles to concrete addresses. Entry points receive a
//! [`CallContext`] naming the caller and check it against these roles; the
//! ledger's own escrow address stands in for internal self-calls.

use crate::core::Address;
use serde::{Deserialize, Serialize};
use super::error::{StakingError, StakingResult};

/// Logical roles the ledger interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Changes staking parameters
    Admin,
    /// Drives delegation, unbonding and slashing
    StakingManager,
    /// Receives unbond fees
    Treasury,
    /// Reward engine; unbonds runner commission
    RewardsDistributor,
    /// Receives slashed value
    PenaltyReceiver,
    /// Account holding all staked value
    Escrow,
}

/// Role addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    pub admin: Address,
    pub staking_manager: Address,
    pub treasury: Address,
    pub rewards_distributor: Address,
    pub penalty_receiver: Address,
    pub escrow: Address,
}

impl AddressBook {
    /// Address book whose roles are derived from their names
    pub fn derived() -> Self {
        Self {
            admin: Address::derive("admin"),
            staking_manager: Address::derive("staking_manager"),
            treasury: Address::derive("treasury"),
            rewards_distributor: Address::derive("rewards_distributor"),
            penalty_receiver: Address::derive("penalty_receiver"),
            escrow: Address::derive("escrow"),
        }
    }

    /// Resolve a role
    pub fn get(&self, role: Role) -> Address {
        match role {
            Role::Admin => self.admin,
            Role::StakingManager => self.staking_manager,
            Role::Treasury => self.treasury,
            Role::RewardsDistributor => self.rewards_distributor,
            Role::PenaltyReceiver => self.penalty_receiver,
            Role::Escrow => self.escrow,
        }
    }

    /// Point a role at a new address
    pub fn set(&mut self, role: Role, address: Address) {
        let slot = match role {
            Role::Admin => &mut self.admin,
            Role::StakingManager => &mut self.staking_manager,
            Role::Treasury => &mut self.treasury,
            Role::RewardsDistributor => &mut self.rewards_distributor,
            Role::PenaltyReceiver => &mut self.penalty_receiver,
            Role::Escrow => &mut self.escrow,
        };
        *slot = address;
    }
}

impl Default for AddressBook {
    fn default() -> Self {
        Self::derived()
    }
}

/// Identity of the party invoking an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
}

impl CallContext {
    /// Context for `caller`
    pub fn new(caller: Address) -> Self {
        Self { caller }
    }

    /// Context for the holder of `role`
    pub fn as_role(book: &AddressBook, role: Role) -> Self {
        Self::new(book.get(role))
    }

    pub(crate) fn ensure_manager(&self, book: &AddressBook) -> StakingResult<()> {
        if self.caller != book.staking_manager {
            return Err(StakingError::NotManager(self.caller));
        }
        Ok(())
    }

    pub(crate) fn ensure_manager_or_ledger(&self, book: &AddressBook) -> StakingResult<()> {
        if self.caller != book.staking_manager && self.caller != book.escrow {
            return Err(StakingError::NotManagerOrLedger(self.caller));
        }
        Ok(())
    }

    pub(crate) fn ensure_admin(&self, book: &AddressBook) -> StakingResult<()> {
        if self.caller != book.admin {
            return Err(StakingError::NotAdmin(self.caller));
        }
        Ok(())
    }

    pub(crate) fn ensure_rewards_distributor(&self, book: &AddressBook) -> StakingResult<()> {
        if self.caller != book.rewards_distributor {
            return Err(StakingError::NotRewardsDistributor(self.caller));
        }
        Ok(())
    }
}
