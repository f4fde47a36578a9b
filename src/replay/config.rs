//! Ledger configuration file

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use crate::runtime::DEFAULT_ERA_PERIOD;
use crate::staking::{AddressBook, StakingParams};
use super::ReplayError;

fn default_era_period() -> Timestamp {
    DEFAULT_ERA_PERIOD
}

/// Parameters, role addresses and era length for a replay run.
///
/// Every field is optional in the JSON form:
///
/// ```json
/// { "params": { "lock_period": 3600 }, "era_period": 600 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub params: StakingParams,
    #[serde(default)]
    pub address_book: AddressBook,
    /// Era length in seconds
    #[serde(default = "default_era_period")]
    pub era_period: Timestamp,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            params: StakingParams::default(),
            address_book: AddressBook::derived(),
            era_period: DEFAULT_ERA_PERIOD,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse configuration from JSON and validate the parameters
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let config: Self = serde_json::from_str(json)?;
        config.params.validate()?;
        Ok(config)
    }
}
