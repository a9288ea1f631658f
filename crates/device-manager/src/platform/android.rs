//! Android devices and emulators

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use runway_core::{Result, RunwayError};
use runway_device_bridge::driver::shell_output;
use runway_device_bridge::screen::parse_wm_density;
use runway_device_bridge::{Device, DeviceInventory, LiveDriver, Platform, ShellCommand};

use super::PlatformStrategy;
use crate::shell::execute_shell_command;
use crate::target::TargetSpec;

/// Global setting behind "don't keep activities"
const ALWAYS_FINISH_ACTIVITIES: &str = "always_finish_activities";

pub struct AndroidStrategy;

impl AndroidStrategy {
    /// Density read through `wm density` on the device shell
    async fn shell_density(driver: &dyn LiveDriver) -> Option<f64> {
        match execute_shell_command(driver, &ShellCommand::new("wm", &["density"])).await {
            Ok(output) => {
                let density = output
                    .as_ref()
                    .and_then(shell_output)
                    .as_deref()
                    .and_then(parse_wm_density);
                info!("Device density received from shell command: {:?}", density);
                density
            }
            Err(e) => {
                warn!("wm density failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PlatformStrategy for AndroidStrategy {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn resolve_display_metrics(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &mut Device,
        driver: &dyn LiveDriver,
    ) {
        if !spec.skips_inventory() {
            match inventory.physical_density(device).await {
                Ok(Some(density)) => device.config.density = Some(density),
                Ok(None) => debug!("Inventory has no density for {}", device),
                Err(e) => warn!("Could not read density of {}: {}", device, e),
            }
        }

        if spec.policy.relaxed_security {
            if let Some(density) = Self::shell_density(driver).await {
                device.config.density = Some(density);
            }
        }

        if let Some(density) = device.config.density {
            device.config.offset_pixels = Some(inventory.screen_offset(density));
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
        info!("Installed {:?} on {}", app, device);
        Ok(())
    }

    async fn uninstall_app(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
    ) -> Result<()> {
        inventory
            .uninstall_app(device, None, spec.app_package.as_deref())
            .await?;
        Ok(())
    }

    async fn set_dont_keep_activities(
        &self,
        inventory: &dyn DeviceInventory,
        spec: &TargetSpec,
        device: &Device,
        driver: &dyn LiveDriver,
        value: bool,
    ) -> Result<()> {
        if !spec.skips_inventory() {
            inventory.set_dont_keep_activities(device, value).await?;
        } else if spec.policy.relaxed_security {
            let status = if value { "1" } else { "0" };
            let put = ShellCommand::new(
                "settings",
                &["put", "global", ALWAYS_FINISH_ACTIVITIES, status],
            );
            execute_shell_command(driver, &put).await?;

            let get = ShellCommand::new("settings", &["get", "global", ALWAYS_FINISH_ACTIVITIES]);
            let check = execute_shell_command(driver, &get).await?;
            info!(
                "{}: {}",
                ALWAYS_FINISH_ACTIVITIES,
                check.as_ref().and_then(shell_output).unwrap_or_default().trim()
            );
        }
        Ok(())
    }

    fn package_id(
        &self,
        inventory: &dyn DeviceInventory,
        _device: &Device,
        app_path: &Path,
    ) -> Result<String> {
        Ok(inventory.android_package_id(app_path)?)
    }
}
