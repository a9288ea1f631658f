//! Device Types and State
//!
//! Represents test targets (emulators, simulators and physical devices)
//! as reported by a device inventory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix the Android tooling puts in front of emulator serials
pub const EMULATOR_TOKEN_PREFIX: &str = "emulator-";

/// Mobile platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Platform names are matched case-insensitively ("Android", "iOS", ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Device kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Android emulator
    Emulator,
    /// iOS simulator
    Simulator,
    /// Physical device connected to the host
    Physical,
    /// Real device hosted elsewhere
    Real,
}

impl DeviceKind {
    /// Emulators and simulators are cheap to keep running and are reused
    pub fn is_virtual(&self) -> bool {
        matches!(self, DeviceKind::Emulator | DeviceKind::Simulator)
    }
}

/// Runtime status as reported by the inventory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    Shutdown,
    Booted,
    /// Any other inventory-defined state (busy, invalid, ...)
    Other(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Shutdown => "Shutdown",
            DeviceStatus::Booted => "Booted",
            DeviceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metrics used to translate logical coordinates into taps
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Physical pixels per logical unit
    pub density: Option<f64>,
    /// Vertical offset in pixels (status/action bar height)
    pub offset_pixels: Option<i32>,
}

impl DisplayConfig {
    pub fn is_empty(&self) -> bool {
        self.density.is_none() && self.offset_pixels.is_none()
    }
}

/// Device information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Display name (AVD name, simulator name, model)
    pub name: String,
    /// Unique token (serial, udid, emulator port)
    pub token: Option<String>,
    /// Platform
    pub platform: Platform,
    /// Device kind, unknown for descriptors synthesized from a request
    pub kind: Option<DeviceKind>,
    /// OS version / api level
    pub api_level: Option<String>,
    /// Runtime status, `None` until an inventory reported one
    pub status: Option<DeviceStatus>,
    /// Display metrics
    #[serde(default)]
    pub config: DisplayConfig,
}

impl Device {
    /// Create a descriptor that has not been looked up in any inventory
    pub fn new(name: impl Into<String>, api_level: Option<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            token: None,
            platform,
            kind: None,
            api_level,
            status: None,
            config: DisplayConfig::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_booted(&self) -> bool {
        self.status == Some(DeviceStatus::Booted)
    }

    pub fn is_shutdown(&self) -> bool {
        self.status == Some(DeviceStatus::Shutdown)
    }

    /// Check if this is an emulator or simulator
    pub fn is_virtual(&self) -> bool {
        self.kind.map(|k| k.is_virtual()).unwrap_or(false)
    }

    /// Get display name
    pub fn display_name(&self) -> String {
        match self.token {
            Some(ref token) => format!("{} ({})", self.name, token),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}", self.display_name(), self.platform)?;
        if let Some(ref api) = self.api_level {
            write!(f, " {}", api)?;
        }
        if let Some(ref status) = self.status {
            write!(f, ", {}", status)?;
        }
        write!(f, "]")
    }
}

/// Strip the emulator serial prefix from a token
pub fn normalize_token(token: &str) -> &str {
    token.strip_prefix(EMULATOR_TOKEN_PREFIX).unwrap_or(token)
}

/// Partial-match device filter
///
/// Every field that is set must match; unset fields match anything.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub token: Option<String>,
    pub name: Option<String>,
    pub api_level: Option<String>,
    pub status: Option<DeviceStatus>,
    pub kind: Option<DeviceKind>,
}

impl DeviceFilter {
    /// Filter by unique token
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Filter by name and api level
    pub fn name_and_version(name: impl Into<String>, api_level: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            api_level,
            ..Default::default()
        }
    }

    /// Filter by status
    pub fn status(status: DeviceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Check if device matches filter
    pub fn matches(&self, device: &Device) -> bool {
        if let Some(ref token) = self.token {
            if device.token.as_deref() != Some(token.as_str()) {
                return false;
            }
        }
        if let Some(ref name) = self.name {
            if &device.name != name {
                return false;
            }
        }
        if let Some(ref api) = self.api_level {
            if device.api_level.as_deref() != Some(api.as_str()) {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if device.status.as_ref() != Some(status) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if device.kind != Some(kind) {
                return false;
            }
        }
        true
    }

    /// Keep matching devices, preserving inventory order
    pub fn apply(&self, devices: &[Device]) -> Vec<Device> {
        devices.iter().filter(|d| self.matches(d)).cloned().collect()
    }

    /// First matching device
    pub fn first(&self, devices: &[Device]) -> Option<Device> {
        devices.iter().find(|d| self.matches(d)).cloned()
    }
}
