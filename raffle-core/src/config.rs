use crate::error::{RaffleError, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const MUMBAI_CHAIN_ID: u64 = 80001;
pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/santhoshsiva97/newrandomgame";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// JSON-RPC endpoint of the wallet provider
    pub rpc_url: String,
    /// Chain the game contract is deployed on
    pub chain_id: u64,
    pub network_name: String,
    pub contract_address: Address,
    pub subgraph_url: String,
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
    pub confirmations: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: MUMBAI_CHAIN_ID,
            network_name: "mumbai".to_string(),
            contract_address: Address::zero(),
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            poll_interval: Duration::from_secs(3),
            confirmations: 1,
        }
    }
}

impl GameConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address,
            ..Self::default()
        }
    }

    /// Loads a JSON config file; fields absent from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(RaffleError::config("RPC URL cannot be empty"));
        }

        if self.subgraph_url.is_empty() {
            return Err(RaffleError::config("Subgraph URL cannot be empty"));
        }

        if self.contract_address.is_zero() {
            return Err(RaffleError::config("Contract address must be set"));
        }

        if self.poll_interval.is_zero() {
            return Err(RaffleError::config("Poll interval must be greater than 0"));
        }

        if self.confirmations == 0 {
            return Err(RaffleError::config("Confirmations must be greater than 0"));
        }

        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
