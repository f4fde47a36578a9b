//! Core types shared by the staking ledger and its collaborators

pub mod address;
pub mod era;

pub use address::{Address, AddressParseError};
pub use era::{Amount, EraId, Timestamp};
