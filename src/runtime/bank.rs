//! Token Bank - in-memory balances with atomic batched settlement

use std::collections::HashMap;

use crate::core::{Address, Amount};
use crate::staking::{Transfer, TransferError, ValueTransfer};

/// In-memory token balances
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    balances: HashMap<Address, Amount>,
    /// Settled transfer legs, oldest first
    history: Vec<Transfer>,
}

impl TokenBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bank with initial balances
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, Amount)>) -> Self {
        Self {
            balances: balances.into_iter().collect(),
            history: Vec::new(),
        }
    }

    /// Get account balance
    pub fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Credit account (mint)
    pub fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), TransferError> {
        let balance = self
            .balance(account)
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*account))?;
        self.balances.insert(*account, balance);
        Ok(())
    }

    /// Settled transfers
    pub fn history(&self) -> &[Transfer] {
        &self.history
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}

impl ValueTransfer for TokenBank {
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), TransferError> {
        // Stage every leg against a scratch copy of the touched balances
        let mut staged: HashMap<Address, Amount> = HashMap::new();
        for transfer in transfers {
            let from = *staged
                .entry(transfer.from)
                .or_insert_with(|| self.balance(&transfer.from));
            let debited = from
                .checked_sub(transfer.amount)
                .ok_or(TransferError::InsufficientBalance {
                    account: transfer.from,
                    balance: from,
                    required: transfer.amount,
                })?;
            staged.insert(transfer.from, debited);

            let to = *staged
                .entry(transfer.to)
                .or_insert_with(|| self.balance(&transfer.to));
            let credited = to
                .checked_add(transfer.amount)
                .ok_or(TransferError::Overflow(transfer.to))?;
            staged.insert(transfer.to, credited);
        }

        self.balances.extend(staged);
        self.history.extend_from_slice(transfers);
        Ok(())
    }
}
