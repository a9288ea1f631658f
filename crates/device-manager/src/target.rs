//! Target Specification
//!
//! What the caller asks for: a platform, a device name and version (or a
//! udid), a run lane and the device policy.

use std::path::PathBuf;

use runway_core::config::DEFAULT_RUN_TYPE;
use runway_core::{EnvOverride, HarnessConfig, PolicyConfig, Result};
use runway_device_bridge::{Device, DeviceFilter, DisplayConfig, Platform};

/// Device request for one test run
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub platform: Platform,
    pub device_name: String,
    /// OS version / api level
    pub platform_version: Option<String>,
    /// Unique token, takes precedence over name and version
    pub udid: Option<String>,
    /// Run lane, key of the session registry
    pub run_type: String,
    pub policy: PolicyConfig,
    /// Caller supplied density, seeded into synthesized descriptors
    pub density: Option<f64>,
    /// Caller supplied offset, seeded into synthesized descriptors
    pub offset_pixels: Option<i32>,
    pub app_path: Option<PathBuf>,
    /// iOS bundle id
    pub bundle_id: Option<String>,
    /// Android package name
    pub app_package: Option<String>,
    /// Device injected by the environment, wins over everything else
    pub env_override: EnvOverride,
}

impl TargetSpec {
    /// Request a device by name with default policy and no overrides
    pub fn new(platform: Platform, device_name: impl Into<String>) -> Self {
        Self {
            platform,
            device_name: device_name.into(),
            platform_version: None,
            udid: None,
            run_type: DEFAULT_RUN_TYPE.to_string(),
            policy: PolicyConfig::default(),
            density: None,
            offset_pixels: None,
            app_path: None,
            bundle_id: None,
            app_package: None,
            env_override: EnvOverride::default(),
        }
    }

    /// Request a device using a platform name as found in capabilities
    pub fn parse(platform_name: &str, device_name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(platform_name.parse()?, device_name))
    }

    /// Seed policy, run lane and environment overrides from the harness config
    pub fn from_config(
        config: &HarnessConfig,
        platform: Platform,
        device_name: impl Into<String>,
    ) -> Self {
        let mut spec = Self::new(platform, device_name);
        spec.run_type = config.run_type.clone();
        spec.policy = config.policy.clone();
        spec.env_override = config.env_override();
        spec
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.platform_version = Some(version.into());
        self
    }

    pub fn with_udid(mut self, udid: impl Into<String>) -> Self {
        self.udid = Some(udid.into());
        self
    }

    pub fn with_run_type(mut self, run_type: impl Into<String>) -> Self {
        self.run_type = run_type.into();
        self
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_env_override(mut self, env_override: EnvOverride) -> Self {
        self.env_override = env_override;
        self
    }

    pub fn reuse_device(mut self, reuse: bool) -> Self {
        self.policy.reuse_device = reuse;
        self
    }

    /// Remote lab requests never consult the local inventory
    pub fn skips_inventory(&self) -> bool {
        self.policy.skips_inventory()
    }

    /// Teardown leaves the device alone
    pub fn keeps_device_running(&self) -> bool {
        self.policy.reuse_device || self.skips_inventory()
    }

    /// Descriptor built from the request alone, no inventory lookup
    pub fn default_device(&self) -> Device {
        let mut device = Device::new(
            self.device_name.clone(),
            self.platform_version.clone(),
            self.platform,
        );
        device.config = DisplayConfig {
            density: self.density,
            offset_pixels: self.offset_pixels,
        };
        device
    }

    /// Filter selecting candidates among the inventory's devices
    pub fn search_filter(&self) -> DeviceFilter {
        match self.udid {
            Some(ref udid) => DeviceFilter::token(udid.clone()),
            None => {
                DeviceFilter::name_and_version(self.device_name.clone(), self.platform_version.clone())
            }
        }
    }

    /// Human readable description of what was asked for
    pub fn requested(&self) -> String {
        match (&self.udid, &self.platform_version) {
            (Some(udid), _) => format!("{} ({})", self.device_name, udid),
            (None, Some(version)) => format!("{} {}", self.device_name, version),
            (None, None) => self.device_name.clone(),
        }
    }
}
