//! Device Inventory
//!
//! The host-side service that knows which devices exist and can boot,
//! kill and provision them. Backends (avd/simctl wrappers, device farms)
//! implement [`DeviceInventory`]; Runway only consumes it.

use std::path::Path;

use async_trait::async_trait;

use crate::device::{Device, DeviceKind, Platform};
use crate::screen::{self, ScreenInfo};

/// Inventory errors
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Inventory unavailable: {0}")]
    Unavailable(String),
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Failed to start device {device}: {reason}")]
    StartFailed { device: String, reason: String },
    #[error("Failed to kill device {device}: {reason}")]
    KillFailed { device: String, reason: String },
    #[error("Install failed: {0}")]
    InstallFailed(String),
    #[error("Unsupported on {0}")]
    Unsupported(Platform),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Device inventory service
#[async_trait]
pub trait DeviceInventory: Send + Sync {
    /// All devices known for a platform, in a stable order
    async fn devices(&self, platform: Platform) -> Result<Vec<Device>, InventoryError>;

    /// Boot a device and return its refreshed descriptor
    async fn start(&self, device: &Device) -> Result<Device, InventoryError>;

    /// Shut a device down
    async fn kill(&self, device: &Device) -> Result<(), InventoryError>;

    /// Install an application bundle
    async fn install_app(&self, device: &Device, app_path: &Path) -> Result<(), InventoryError>;

    /// Remove an application.
    ///
    /// iOS backends receive the bundle path and bundle id, Android backends
    /// the package name.
    async fn uninstall_app(
        &self,
        device: &Device,
        app_path: Option<&Path>,
        app_id: Option<&str>,
    ) -> Result<(), InventoryError>;

    /// Physical density of an Android device, if the backend can read it
    async fn physical_density(&self, device: &Device) -> Result<Option<f64>, InventoryError>;

    /// Toggle the Android "don't keep activities" developer setting
    async fn set_dont_keep_activities(
        &self,
        device: &Device,
        value: bool,
    ) -> Result<(), InventoryError>;

    /// Package name of an Android application bundle
    fn android_package_id(&self, app_path: &Path) -> Result<String, InventoryError>;

    /// Bundle id of an iOS application bundle
    fn ios_package_id(
        &self,
        kind: Option<DeviceKind>,
        app_path: &Path,
    ) -> Result<String, InventoryError>;

    /// Known iOS screens
    fn screen_table(&self) -> Vec<ScreenInfo> {
        screen::ios_screen_table()
    }

    /// Android status bar offset for a density
    fn screen_offset(&self, density: f64) -> i32 {
        screen::android_screen_offset(density)
    }
}
