//! Platform Strategies
//!
//! Everything that differs between Android and iOS sits behind
//! [`PlatformStrategy`]. Strategies are looked up by platform in a
//! [`PlatformTable`].

pub mod android;
pub mod ios;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use runway_core::{Result, RunwayError};
use runway_device_bridge::{Device, DeviceInventory, DeviceStatus, LiveDriver, Platform};

use crate::target::TargetSpec;

pub use android::AndroidStrategy;
pub use ios::IosStrategy;

/// What happened to the selected device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// It was shut down and got booted
    Started,
    /// It was running and got killed and booted again
    Restarted,
    /// It was running and is handed out as is
    Reused,
}

/// Per-platform device behaviour
#[async_trait]
pub trait PlatformStrategy: Send + Sync {
    fn platform(&self) -> Platform;

    /// Statuses to look for among the candidates, in order of preference.
    ///
    /// Without reuse a fresh (shut down) device is preferred; with reuse a
    /// running one. Either way the other status is accepted as fallback.
    fn preferred_statuses(&self, reuse: bool) -> Vec<DeviceStatus> {
        if reuse {
            vec![DeviceStatus::Booted, DeviceStatus::Shutdown]
        } else {
            vec![DeviceStatus::Shutdown, DeviceStatus::Booted]
        }
    }

    /// Bring the selected candidate into a running state.
    ///
    /// Running physical devices are cycled unless reuse was requested.
    /// Running emulators and simulators are always reused.
    async fn start_or_restart(
        &self,
        inventory: &dyn DeviceInventory,
        device: Device,
        reuse: bool,
    ) -> Result<(Device, Lifecycle)> {
        if device.is_shutdown() {
            let started = inventory.start(&device).await?;
            info!("Started device: {}", started);
            return Ok((started, Lifecycle::Started));
        }

        info!("Device is already started: {}", device);
        if !reuse && !device.is_virtual() {
            info!("Device is not reused, shutting down and restarting {}", device);
            inventory.kill(&device).await?;
            let restarted = inventory.start(&device).await?;
            return Ok((restarted, Lifecycle::Restarted));
        }

        Ok((device, Lifecycle::Reused))
    }

    /// Fill `device.config` with density and offset. Never fails.
    async fn resolve_display_metrics(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &mut Device,
        driver: &dyn LiveDriver,
    );

    async fn install_app(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
    ) -> Result<()>;

    async fn uninstall_app(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
    ) -> Result<()>;

    async fn set_dont_keep_activities(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
        driver: &dyn LiveDriver,
        value: bool,
    ) -> Result<()>;

    fn package_id(
        &self,
        inventory: &dyn DeviceInventory,
        device: &Device,
        app_path: &Path,
    ) -> Result<String>;
}

/// First candidate in the most preferred status
pub fn pick_candidate(candidates: &[Device], preferred: &[DeviceStatus]) -> Option<Device> {
    preferred.iter().find_map(|status| {
        candidates
            .iter()
            .find(|d| d.status.as_ref() == Some(status))
            .cloned()
    })
}

/// Platform-keyed dispatch table
pub struct PlatformTable {
    strategies: HashMap<Platform, Arc<dyn PlatformStrategy>>,
}

impl PlatformTable {
    /// Table without any strategy
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Android and iOS
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(Arc::new(AndroidStrategy));
        table.register(Arc::new(IosStrategy));
        table
    }

    /// Register a strategy, replacing the one for the same platform
    pub fn register(&mut self, strategy: Arc<dyn PlatformStrategy>) {
        self.strategies.insert(strategy.platform(), strategy);
    }

    pub fn get(&self, platform: Platform) -> Result<Arc<dyn PlatformStrategy>> {
        self.strategies
            .get(&platform)
            .cloned()
            .ok_or(RunwayError::NoStrategy(platform))
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::standard()
    }
}
