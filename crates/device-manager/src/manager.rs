//! Device Manager
//!
//! Entry point for test harnesses: start a device for a run lane, resolve
//! its display metrics, provision the app and tear the device down again.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use runway_core::{DeviceEvent, EventBus, Result};
use runway_device_bridge::{Device, DeviceInventory, DeviceKind, LiveDriver, Platform, ShellCommand};

use crate::metrics::DisplayMetricsResolver;
use crate::platform::PlatformTable;
use crate::registry::SessionRegistry;
use crate::selector::{DeviceSelector, Selection};
use crate::shell;
use crate::target::TargetSpec;

pub struct DeviceManager {
    inventory: Arc<dyn DeviceInventory>,
    registry: Arc<SessionRegistry>,
    strategies: Arc<PlatformTable>,
    events: Arc<EventBus>,
    selector: DeviceSelector,
    metrics: DisplayMetricsResolver,
    /// Serializes start/stop sequences of the same run lane
    run_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DeviceManager {
    /// Manager with a fresh registry, the standard platforms and its own event bus
    pub fn new(inventory: Arc<dyn DeviceInventory>) -> Self {
        Self::with_parts(
            inventory,
            Arc::new(SessionRegistry::new()),
            Arc::new(PlatformTable::standard()),
            Arc::new(EventBus::new()),
        )
    }

    pub fn with_parts(
        inventory: Arc<dyn DeviceInventory>,
        registry: Arc<SessionRegistry>,
        strategies: Arc<PlatformTable>,
        events: Arc<EventBus>,
    ) -> Self {
        let selector = DeviceSelector::new(
            inventory.clone(),
            registry.clone(),
            strategies.clone(),
            events.clone(),
        );
        let metrics = DisplayMetricsResolver::new(inventory.clone(), strategies.clone());

        Self {
            inventory,
            registry,
            strategies,
            events,
            selector,
            metrics,
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    fn run_lock(&self, run_type: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.run_locks
            .lock()
            .entry(run_type.to_string())
            .or_default()
            .clone()
    }

    /// Select, boot and bind a device for the target's run lane
    pub async fn start_device(&self, spec: &TargetSpec) -> Result<Selection> {
        let lock = self.run_lock(&spec.run_type);
        let _guard = lock.lock().await;

        self.selector.select_and_start(spec).await
    }

    /// Kill the device bound to the target's run lane.
    ///
    /// Skipped when nothing is bound, when reuse is requested, or when the
    /// device belongs to a remote lab or an ignored inventory. The binding
    /// itself is kept. Returns whether a device was killed.
    pub async fn stop_device(&self, spec: &TargetSpec) -> Result<bool> {
        let lock = self.run_lock(&spec.run_type);
        let _guard = lock.lock().await;

        let Some(device) = self.registry.lookup(&spec.run_type) else {
            debug!("No device bound to run type {}", spec.run_type);
            return Ok(false);
        };

        if spec.keeps_device_running() {
            info!("Leaving {} running", device);
            return Ok(false);
        }

        self.kill(&device).await?;
        Ok(true)
    }

    /// Shut a device down unconditionally
    pub async fn kill(&self, device: &Device) -> Result<()> {
        self.inventory.kill(device).await?;
        info!("Killed device: {}", device);
        self.events.emit(DeviceEvent::DeviceKilled {
            device: device.clone(),
        });
        Ok(())
    }

    pub async fn install_app(&self, spec: &TargetSpec, device: &Device) -> Result<()> {
        let strategy = self.strategies.get(spec.platform)?;
        strategy.install_app(self.inventory.as_ref(), spec, device).await
    }

    pub async fn uninstall_app(&self, spec: &TargetSpec, device: &Device) -> Result<()> {
        let strategy = self.strategies.get(spec.platform)?;
        strategy.uninstall_app(self.inventory.as_ref(), spec, device).await
    }

    /// Toggle "don't keep activities". A no-op on iOS.
    pub async fn set_dont_keep_activities(
        &self,
        spec: &TargetSpec,
        device: &Device,
        driver: &dyn LiveDriver,
        value: bool,
    ) -> Result<()> {
        let strategy = self.strategies.get(spec.platform)?;
        strategy
            .set_dont_keep_activities(self.inventory.as_ref(), spec, device, driver, value)
            .await
    }

    /// Run a raw shell command; `None` for non-Android sessions
    pub async fn execute_shell_command(
        driver: &dyn LiveDriver,
        command: &str,
        args: &[&str],
    ) -> Result<Option<Value>> {
        shell::execute_shell_command(driver, &ShellCommand::new(command, args)).await
    }

    /// Resolve density and offset of `device` through the lookup paths
    pub async fn resolve_density(&self, spec: &TargetSpec, device: &mut Device, driver: &dyn LiveDriver) {
        self.metrics.resolve(spec, device, driver).await;
        self.emit_metrics(device);
    }

    /// Apply display metrics once the automation session has started
    pub async fn apply_device_additions_settings(
        &self,
        spec: &TargetSpec,
        device: &mut Device,
        driver: &dyn LiveDriver,
        handshake: &Value,
    ) {
        self.metrics
            .apply_session_settings(spec, device, driver, handshake)
            .await;
        self.emit_metrics(device);
    }

    /// Resolve metrics of the device bound to the target's run lane.
    ///
    /// Returns an annotated copy, the binding itself is left as the
    /// selector wrote it.
    pub async fn resolve_display_metrics(
        &self,
        spec: &TargetSpec,
        driver: &dyn LiveDriver,
    ) -> Option<Device> {
        let mut device = self.registry.lookup(&spec.run_type)?;
        self.resolve_density(spec, &mut device, driver).await;
        Some(device)
    }

    /// Package or bundle id of an application for a device
    pub fn package_id(&self, device: &Device, app_path: &Path) -> Result<String> {
        let platform = if device.kind == Some(DeviceKind::Emulator) {
            Platform::Android
        } else {
            device.platform
        };
        let strategy = self.strategies.get(platform)?;
        strategy.package_id(self.inventory.as_ref(), device, app_path)
    }

    fn emit_metrics(&self, device: &Device) {
        if !device.config.is_empty() {
            self.events.emit(DeviceEvent::MetricsResolved {
                device_name: device.name.clone(),
                config: device.config,
            });
        }
    }
}
