//! Era, amount and timestamp types for the staking ledger

/// An era number (discrete accounting epoch)
pub type EraId = u64;

/// Token amount in celers (1 CEL = 10^9 celers)
pub type Amount = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;
