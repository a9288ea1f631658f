//! Test doubles for the inventory and the live driver

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use runway_device_bridge::driver::SHELL_SCRIPT;
use runway_device_bridge::{
    Device, DeviceInventory, DeviceKind, DeviceStatus, DriverError, InventoryError, LiveDriver,
    Platform, ShellCommand,
};

/// Calls received by [`MockInventory`], devices identified by token or name
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Devices(Platform),
    Start(String),
    Kill(String),
    Install(String, PathBuf),
    Uninstall(String, Option<PathBuf>, Option<String>),
    PhysicalDensity(String),
    DontKeepActivities(String, bool),
}

fn key(device: &Device) -> String {
    device.token.clone().unwrap_or_else(|| device.name.clone())
}

/// In-memory inventory recording every call
#[derive(Default)]
pub struct MockInventory {
    devices: Mutex<Vec<Device>>,
    calls: Mutex<Vec<Call>>,
    density: Option<f64>,
    start_delay: Option<Duration>,
    failing: Mutex<bool>,
}

impl MockInventory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(devices),
            ..Default::default()
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    /// Make every following enumeration fail
    pub fn fail_enumeration(&self) {
        *self.failing.lock() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn lifecycle_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Start(_) | Call::Kill(_)))
            .collect()
    }

    pub fn starts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn kills(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Kill(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn density_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::PhysicalDensity(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn set_status(&self, device: &Device, status: DeviceStatus) -> Device {
        let wanted = key(device);
        let mut devices = self.devices.lock();
        for stored in devices.iter_mut().filter(|d| key(d) == wanted) {
            stored.status = Some(status.clone());
        }
        device.clone().with_status(status)
    }
}

#[async_trait]
impl DeviceInventory for MockInventory {
    async fn devices(&self, platform: Platform) -> Result<Vec<Device>, InventoryError> {
        self.record(Call::Devices(platform));
        if *self.failing.lock() {
            return Err(anyhow::anyhow!("avdmanager not found").into());
        }
        Ok(self
            .devices
            .lock()
            .iter()
            .filter(|d| d.platform == platform)
            .cloned()
            .collect())
    }

    async fn start(&self, device: &Device) -> Result<Device, InventoryError> {
        self.record(Call::Start(key(device)));
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.set_status(device, DeviceStatus::Booted))
    }

    async fn kill(&self, device: &Device) -> Result<(), InventoryError> {
        self.record(Call::Kill(key(device)));
        self.set_status(device, DeviceStatus::Shutdown);
        Ok(())
    }

    async fn install_app(&self, device: &Device, app_path: &Path) -> Result<(), InventoryError> {
        self.record(Call::Install(key(device), app_path.to_path_buf()));
        Ok(())
    }

    async fn uninstall_app(
        &self,
        device: &Device,
        app_path: Option<&Path>,
        app_id: Option<&str>,
    ) -> Result<(), InventoryError> {
        self.record(Call::Uninstall(
            key(device),
            app_path.map(Path::to_path_buf),
            app_id.map(str::to_string),
        ));
        Ok(())
    }

    async fn physical_density(&self, device: &Device) -> Result<Option<f64>, InventoryError> {
        self.record(Call::PhysicalDensity(key(device)));
        Ok(self.density)
    }

    async fn set_dont_keep_activities(
        &self,
        device: &Device,
        value: bool,
    ) -> Result<(), InventoryError> {
        self.record(Call::DontKeepActivities(key(device), value));
        Ok(())
    }

    fn android_package_id(&self, app_path: &Path) -> Result<String, InventoryError> {
        Ok(format!("android:{}", app_path.display()))
    }

    fn ios_package_id(
        &self,
        kind: Option<DeviceKind>,
        app_path: &Path,
    ) -> Result<String, InventoryError> {
        Ok(format!("ios:{:?}:{}", kind, app_path.display()))
    }
}

/// Driver answering shell commands from a canned table.
///
/// `settings put`/`settings get` behave like a tiny settings store.
pub struct MockDriver {
    platform: Platform,
    responses: HashMap<String, Value>,
    settings: Mutex<HashMap<String, String>>,
    executed: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockDriver {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            responses: HashMap::new(),
            settings: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Answer every command only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `command` (command and args joined by spaces) with `value`
    pub fn respond(mut self, command: &str, value: Value) -> Self {
        self.responses.insert(command.to_string(), value);
        self
    }

    /// Shell commands executed so far
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl LiveDriver for MockDriver {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn execute(&self, script: &str, args: Value) -> Result<Value, DriverError> {
        if script != SHELL_SCRIPT {
            return Err(DriverError::Rejected(script.to_string()));
        }

        let cmd: ShellCommand = serde_json::from_value(args)?;
        let line = std::iter::once(cmd.command.as_str())
            .chain(cmd.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.executed.lock().push(line.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if cmd.command == "settings" && cmd.args.len() >= 3 {
            let name = cmd.args[2].clone();
            match cmd.args[0].as_str() {
                "put" => {
                    let value = cmd.args.get(3).cloned().unwrap_or_default();
                    self.settings.lock().insert(name, value);
                    return Ok(Value::Null);
                }
                "get" => {
                    let value = self.settings.lock().get(&name).cloned();
                    return Ok(value.map(Value::String).unwrap_or(Value::Null));
                }
                _ => {}
            }
        }

        Ok(self.responses.get(&line).cloned().unwrap_or(Value::Null))
    }
}
