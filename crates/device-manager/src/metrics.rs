//! Display Metrics Resolver
//!
//! Works out density and tap offset of a running device. Sources, from
//! most to least authoritative:
//! - density reported by the live session handshake
//! - `wm density` through the driver (relaxed security only)
//! - the inventory (Android) or the static screen table (iOS)
//!
//! Missing metrics are logged, never escalated.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use runway_device_bridge::{Device, DeviceInventory, DisplayConfig, LiveDriver, SessionCapabilities};

use crate::platform::PlatformTable;
use crate::target::TargetSpec;

pub struct DisplayMetricsResolver {
    inventory: Arc<dyn DeviceInventory>,
    strategies: Arc<PlatformTable>,
}

impl DisplayMetricsResolver {
    pub fn new(inventory: Arc<dyn DeviceInventory>, strategies: Arc<PlatformTable>) -> Self {
        Self {
            inventory,
            strategies,
        }
    }

    /// Resolve density and offset through the platform lookup paths
    pub async fn resolve(&self, spec: &TargetSpec, device: &mut Device, driver: &dyn LiveDriver) {
        let strategy = match self.strategies.get(spec.platform) {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!("Cannot resolve display metrics: {}", e);
                return;
            }
        };

        strategy
            .resolve_display_metrics(self.inventory.as_ref(), spec, device, driver)
            .await;
    }

    /// Apply metrics once the automation session is up.
    ///
    /// Does nothing when the device already has a non-zero offset. Otherwise the
    /// config is reset and the density reported in the session handshake
    /// is used, falling back to [`resolve`](Self::resolve).
    pub async fn apply_session_settings(
        &self,
        spec: &TargetSpec,
        device: &mut Device,
        driver: &dyn LiveDriver,
        handshake: &Value,
    ) {
        if device.config.offset_pixels.is_some_and(|offset| offset != 0) {
            return;
        }

        device.config = DisplayConfig::default();
        let reported = SessionCapabilities::from_handshake(handshake).density();

        match reported {
            Some(density) => {
                info!("Density from automation session: {}", density);
                device.config.density = Some(density);
                device.config.offset_pixels = Some(self.inventory.screen_offset(density));
            }
            None => self.resolve(spec, device, driver).await,
        }

        if device.config.density.is_some() {
            info!("Device setting: {:?}", device.config);
        } else {
            warn!("Could not resolve device density. Please provide offset in the capabilities");
        }
    }
}
