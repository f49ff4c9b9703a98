//! Configuration management for AirChip

use crate::error::ChainError;
use crate::miner::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "airchip.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChainConfig {
    /// Leading hex zeros a block hash must carry.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_genesis_supply")]
    pub genesis_supply: u64,
    /// Reject unsigned transfers from non-reserved senders.
    #[serde(default)]
    pub require_signatures: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            genesis_supply: default_genesis_supply(),
            require_signatures: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MinerConfig {
    #[serde(default = "default_miner_address")]
    pub address: String,
    #[serde(default = "default_reward")]
    pub reward: u64,
    /// Paid instead of `reward` when the miner wins the bonus challenge.
    #[serde(default = "default_bonus_reward")]
    pub bonus_reward: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            address: default_miner_address(),
            reward: default_reward(),
            bonus_reward: default_bonus_reward(),
        }
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_genesis_supply() -> u64 {
    1_000_000
}

fn default_miner_address() -> String {
    "miner1".to_string()
}

fn default_reward() -> u64 {
    10
}

fn default_bonus_reward() -> u64 {
    30
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ChainError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.chain.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::ConfigError(format!(
                "chain.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.chain.difficulty
            )));
        }
        if i64::try_from(self.chain.genesis_supply).is_err() {
            return Err(ChainError::ConfigError(format!(
                "chain.genesis_supply {} exceeds the ledger range",
                self.chain.genesis_supply
            )));
        }
        if self.miner.address.is_empty() {
            return Err(ChainError::ConfigError(
                "miner.address must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    if !path.exists() {
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }

    let config_str = fs::read_to_string(path)?;
    Config::from_toml_str(&config_str)
}
