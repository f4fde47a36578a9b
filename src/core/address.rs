//! Ledger addresses
//!
//! Sources, runners and the named roles (treasury, escrow, managers) are all
//! identified by a 32-byte address rendered as base58.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Account address (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Create from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    /// Create zero address
    pub fn zero() -> Self {
        Address([0u8; 32])
    }

    /// Derive a deterministic address from a label.
    ///
    /// Used for well-known role addresses and for naming participants in
    /// replay scripts (`"alice"`, `"treasury"`, ...).
    pub fn derive(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"CELEREUM_STAKING_ADDRESS_V1");
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Address(bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if address is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to base58 string
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Parse from base58 string
    pub fn from_base58(s: &str) -> Result<Self, AddressParseError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(AddressParseError::Base58)?;
        if bytes.len() != 32 {
            return Err(AddressParseError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }
}

/// Address parsing error
#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    #[error("Base58 error: {0:?}")]
    Base58(bs58::decode::Error),

    #[error("Invalid address length: {0} (expected 32)")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

// Base58 in human-readable formats (JSON configs and scripts), raw bytes otherwise.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::from_base58(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Address)
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_base58()[..8])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(Address::derive("alice"), Address::derive("alice"));
        assert_ne!(Address::derive("alice"), Address::derive("bob"));
        assert!(!Address::derive("alice").is_zero());
    }

    #[test]
    fn test_base58_parse() {
        let addr = Address::derive("runner-1");
        let parsed: Address = addr.to_base58().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_json_uses_base58() {
        let addr = Address::derive("treasury");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_base58()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let bytes = bincode::serialize(&addr).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bincode::deserialize::<Address>(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_invalid_length_rejected() {
        let short = bs58::encode([1u8; 8]).into_string();
        assert!(matches!(
            Address::from_base58(&short),
            Err(AddressParseError::InvalidLength(8))
        ));
    }
}
