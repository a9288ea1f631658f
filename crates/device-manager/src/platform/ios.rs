//! iOS simulators and devices

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use runway_core::{Result, RunwayError};
use runway_device_bridge::screen::lookup_screen;
use runway_device_bridge::{Device, DeviceInventory, LiveDriver, Platform};

use super::PlatformStrategy;
use crate::target::TargetSpec;

pub struct IosStrategy;

#[async_trait]
impl PlatformStrategy for IosStrategy {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn resolve_display_metrics(
        &self,
        inventory: &dyn DeviceInventory,
        _spec: &TargetSpec,
        device: &mut Device,
        _driver: &dyn LiveDriver,
    ) {
        let table = inventory.screen_table();
        match lookup_screen(&table, &device.name) {
            Some(screen) => {
                device.config.density = device.config.density.or(Some(screen.density));
                device.config.offset_pixels = Some(screen.action_bar_height);
            }
            None => debug!("No screen info for {}", device.name),
        }
    }

    async fn install_app(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
    ) -> Result<()> {
        let app = spec.app_path.as_deref().ok_or(RunwayError::MissingField("app path"))?;
        inventory.install_app(device, app).await?;
        info!("Application is successfully installed on {}", device);
        Ok(())
    }

    async fn uninstall_app(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
    ) -> Result<()> {
        inventory
            .uninstall_app(device, spec.app_path.as_deref(), spec.bundle_id.as_deref())
            .await?;
        Ok(())
    }

    async fn set_dont_keep_activities(
        &self,
        _inventory: &dyn DeviceInventory,
        _spec: &TargetSpec,
        _device: &Device,
        _driver: &dyn LiveDriver,
        _value: bool,
    ) -> Result<()> {
        // no such setting on iOS
        Ok(())
    }

    fn package_id(
        &self,
        inventory: &dyn DeviceInventory,
        device: &Device,
        app_path: &Path,
    ) -> Result<String> {
        Ok(inventory.ios_package_id(device.kind, app_path)?)
    }
}
