//! Deferred Value Cell
//!
//! The accounting primitive behind every delegation and runner total:
//! `value_at` is the value effective in `era`, `value_after` is the value
//! that becomes effective from the next era onward. Requests accumulate in
//! `value_after`; crossing an era boundary promotes it to `value_at`.

use crate::core::{Amount, EraId};
use serde::{Deserialize, Serialize};

/// `{ era, value_at, value_after }` accounting cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredValue {
    /// Era the cell was last reconciled against
    pub era: EraId,
    /// Value effective in `era`
    pub value_at: Amount,
    /// Value effective once the pending change settles
    pub value_after: Amount,
}

impl DeferredValue {
    /// Create a cell whose current and pending values are both `value`
    pub fn settled(era: EraId, value: Amount) -> Self {
        Self {
            era,
            value_at: value,
            value_after: value,
        }
    }

    /// Promote `value_after` to `value_at` if `current_era` is newer than
    /// the cell. Repeating with the same era is a no-op.
    pub fn reconcile(&mut self, current_era: EraId) {
        if self.era < current_era {
            self.era = current_era;
            self.value_at = self.value_after;
        }
    }

    /// Copy of this cell reconciled against `current_era`
    pub fn reconciled(mut self, current_era: EraId) -> Self {
        self.reconcile(current_era);
        self
    }

    /// True when neither the current nor the pending value holds stake
    pub fn is_empty(&self) -> bool {
        self.value_at == 0 && self.value_after == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reconcile_promotes_pending_value() {
        let mut cell = DeferredValue {
            era: 2,
            value_at: 100,
            value_after: 600,
        };

        cell.reconcile(2);
        assert_eq!(cell.value_at, 100);

        cell.reconcile(3);
        assert_eq!(cell.era, 3);
        assert_eq!(cell.value_at, 600);
        assert_eq!(cell.value_after, 600);
    }

    #[test]
    fn test_reconcile_ignores_older_era() {
        let mut cell = DeferredValue {
            era: 5,
            value_at: 10,
            value_after: 20,
        };
        cell.reconcile(4);
        assert_eq!(cell, DeferredValue { era: 5, value_at: 10, value_after: 20 });
    }

    #[test]
    fn test_settled_cell() {
        let cell = DeferredValue::settled(1, 1000);
        assert_eq!(cell.value_at, 1000);
        assert_eq!(cell.value_after, 1000);
        assert!(!cell.is_empty());
        assert!(DeferredValue::default().is_empty());
    }

    proptest! {
        #[test]
        fn reconcile_is_idempotent(
            era in 0u64..1_000,
            value_at in any::<u64>(),
            value_after in any::<u64>(),
            current in 0u64..2_000,
        ) {
            let cell = DeferredValue { era, value_at, value_after };
            let once = cell.reconciled(current);
            let twice = once.reconciled(current);
            prop_assert_eq!(once, twice);
            prop_assert!(once.era >= cell.era);
        }
    }
}
