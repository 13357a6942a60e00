use alloy::primitives::Address;
use serde::Deserialize;

use crate::domain::witness::ProofSystem;

/// Pool deployment configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Chain id of the deployment, bound into every note.
    pub chain_id: u64,
    /// Address of the pool contract.
    pub pool_address: Address,
    /// Block number at which the pool was deployed; event scans start here.
    pub deployment_block: u64,
    /// Which verifier the deployment runs.
    pub proof_system: ProofSystem,
    /// RPC endpoint; absent when running purely against mocks.
    pub rpc_url: Option<String>,
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl PoolConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::Validation("chain_id must be non-zero".into()));
        }
        if self.pool_address == Address::ZERO {
            return Err(ConfigError::Validation(
                "pool_address must not be the zero address".into(),
            ));
        }
        Ok(())
    }
}
