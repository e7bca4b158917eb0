use anyhow::{Context, Result};
use raffle_core::{Address, GameConfig};
use std::path::{Path, PathBuf};

/// Connection flags that override values from the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub contract: Option<Address>,
    pub subgraph_url: Option<String>,
    pub chain_id: Option<u64>,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("raffle")
        .join("config.json")
}

/// Reads the config file if present and applies flag overrides on top.
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<GameConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut config = if path.exists() {
        GameConfig::from_file(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        GameConfig::default()
    };

    if let Some(rpc_url) = overrides.rpc_url {
        config.rpc_url = rpc_url;
    }
    if let Some(contract) = overrides.contract {
        config.contract_address = contract;
    }
    if let Some(subgraph_url) = overrides.subgraph_url {
        config.subgraph_url = subgraph_url;
    }
    if let Some(chain_id) = overrides.chain_id {
        config.chain_id = chain_id;
    }

    Ok(config)
}
