//! Harness Configuration
//!
//! Defaults for every test run driven through Runway:
//! - run lane name
//! - device reuse / remote lab / inventory policy
//! - names of the environment variables carrying device overrides

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RunwayError};

/// Default run lane
pub const DEFAULT_RUN_TYPE: &str = "default";

/// Environment variable carrying an injected device token
pub const DEVICE_TOKEN_VAR: &str = "DEVICE_TOKEN";

/// Environment variable carrying an injected device name
pub const DEVICE_NAME_VAR: &str = "DEVICE_NAME";

/// Device policy flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Reuse an already running device instead of cycling it
    pub reuse_device: bool,
    /// Devices live in a remote lab, never touch the local inventory
    pub remote_lab: bool,
    /// Skip the local inventory, allow raw shell fallbacks
    pub ignore_inventory: bool,
    /// Allow raw shell commands through the live driver
    pub relaxed_security: bool,
}

impl PolicyConfig {
    /// The local inventory must not be consulted
    pub fn skips_inventory(&self) -> bool {
        self.remote_lab || self.ignore_inventory
    }
}

/// Environment override configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    pub token_var: String,
    pub name_var: String,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            token_var: DEVICE_TOKEN_VAR.to_string(),
            name_var: DEVICE_NAME_VAR.to_string(),
        }
    }
}

/// Device token/name injected by the environment (CI agents, device farms)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverride {
    pub token: Option<String>,
    pub name: Option<String>,
}

impl EnvOverride {
    /// Read overrides from the process environment
    pub fn from_env(config: &OverrideConfig) -> Self {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup. Empty values are ignored.
    pub fn from_lookup<F>(config: &OverrideConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            token: read(&config.token_var),
            name: read(&config.name_var),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.name.is_none()
    }
}

/// Main harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Configuration version for migrations
    pub version: u32,
    /// Run lane used when the caller does not name one
    pub run_type: String,
    /// Policy defaults
    pub policy: PolicyConfig,
    /// Environment override variables
    pub overrides: OverrideConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            version: 1,
            run_type: DEFAULT_RUN_TYPE.to_string(),
            policy: PolicyConfig::default(),
            overrides: OverrideConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: HarnessConfig = toml::from_str(contents)?;
        if config.run_type.trim().is_empty() {
            return Err(RunwayError::Config("run_type must not be empty".into()));
        }
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Overrides currently present in the environment
    pub fn env_override(&self) -> EnvOverride {
        EnvOverride::from_env(&self.overrides)
    }
}
