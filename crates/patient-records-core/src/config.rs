//! Store configuration.
//!
//! Defaults match the mock backend: a 1.5 second simulated fetch that always
//! succeeds. Any field can be overridden with a `PATIENT_RECORDS_` prefixed
//! environment variable, e.g. `PATIENT_RECORDS_LOAD_DELAY_MS=0`.

use std::time::Duration;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "PATIENT_RECORDS";

const DEFAULT_LOAD_DELAY_MS: u64 = 1500;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Simulated network delay for the initial load
    pub load_delay_ms: u64,
    /// When set, every load fails with this message
    pub simulate_failure: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: DEFAULT_LOAD_DELAY_MS,
            simulate_failure: None,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `PATIENT_RECORDS_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_prefix(ENV_PREFIX)
    }

    pub fn from_env_prefix(prefix: &str) -> ConfigResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;
        let parsed: StoreConfig = config.try_deserialize()?;
        log::debug!("Loaded store config: {:?}", parsed);
        Ok(parsed)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}
