//! Runner Registry
//!
//! Dense arena of active runners plus a reverse index from address to arena
//! slot. Removal swaps the last runner into the freed slot, so both add and
//! remove are O(1) and iteration order is not meaningful.

use crate::core::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use super::error::{StakingError, StakingResult};

/// Active runner set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerRegistry {
    /// Arena of runners, `runners[runner_no[r]] == r`
    runners: Vec<Address>,
    /// Reverse index into `runners`
    runner_no: HashMap<Address, usize>,
}

impl RunnerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runner
    pub fn add(&mut self, runner: Address) -> StakingResult<()> {
        if self.runner_no.contains_key(&runner) {
            return Err(StakingError::RunnerAlreadyRegistered(runner));
        }
        self.runner_no.insert(runner, self.runners.len());
        self.runners.push(runner);
        Ok(())
    }

    /// Deregister a runner, moving the last runner into its slot
    pub fn remove(&mut self, runner: &Address) -> StakingResult<()> {
        let slot = self
            .runner_no
            .remove(runner)
            .ok_or(StakingError::RunnerNotRegistered(*runner))?;

        self.runners.swap_remove(slot);
        if let Some(moved) = self.runners.get(slot) {
            self.runner_no.insert(*moved, slot);
        }
        Ok(())
    }

    /// Check if a runner is registered
    pub fn contains(&self, runner: &Address) -> bool {
        self.runner_no.contains_key(runner)
    }

    /// Runner at arena slot `slot`
    pub fn get(&self, slot: usize) -> Option<&Address> {
        self.runners.get(slot)
    }

    /// Arena slot of a runner
    pub fn slot_of(&self, runner: &Address) -> Option<usize> {
        self.runner_no.get(runner).copied()
    }

    /// Number of registered runners
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    /// Check if no runners are registered
    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// All registered runners in arena order
    pub fn runners(&self) -> &[Address] {
        &self.runners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn runner(n: u8) -> Address {
        Address::new([n; 32])
    }

    #[test]
    fn test_add_and_lookup() {
        let mut registry = RunnerRegistry::new();
        registry.add(runner(1)).unwrap();
        registry.add(runner(2)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.slot_of(&runner(2)), Some(1));
        assert!(matches!(
            registry.add(runner(1)),
            Err(StakingError::RunnerAlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_remove_swaps_last_into_slot() {
        let mut registry = RunnerRegistry::new();
        for n in 1..=4 {
            registry.add(runner(n)).unwrap();
        }

        registry.remove(&runner(2)).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(1), Some(&runner(4)));
        assert_eq!(registry.slot_of(&runner(4)), Some(1));
        assert_eq!(registry.slot_of(&runner(2)), None);
    }

    #[test]
    fn test_remove_last_and_unknown() {
        let mut registry = RunnerRegistry::new();
        registry.add(runner(1)).unwrap();
        registry.remove(&runner(1)).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove(&runner(1)),
            Err(StakingError::RunnerNotRegistered(_))
        ));
    }

    proptest! {
        #[test]
        fn reverse_index_is_a_bijection(ops in prop::collection::vec((any::<bool>(), 0u8..12), 0..80)) {
            let mut registry = RunnerRegistry::new();
            for (add, n) in ops {
                if add {
                    let _ = registry.add(runner(n));
                } else {
                    let _ = registry.remove(&runner(n));
                }
                prop_assert_eq!(registry.runner_no.len(), registry.runners.len());
                for (slot, r) in registry.runners().iter().enumerate() {
                    prop_assert_eq!(registry.slot_of(r), Some(slot));
                }
            }
        }
    }
}
