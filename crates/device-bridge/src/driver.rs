//! Live Driver
//!
//! Boundary to the automation session driving a running device.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::device::Platform;
use crate::screen::density_from_dpi;

/// Script name used to run a raw shell command through the driver
pub const SHELL_SCRIPT: &str = "mobile: shell";

/// Driver errors
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Session not started")]
    NoSession,
    #[error("Command rejected: {0}")]
    Rejected(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A live automation session
#[async_trait]
pub trait LiveDriver: Send + Sync {
    /// Platform of the session
    fn platform(&self) -> Platform;

    /// Execute a driver script (`mobile: shell`, ...)
    async fn execute(&self, script: &str, args: Value) -> Result<Value, DriverError>;
}

/// Shell command in the shape `mobile: shell` expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl ShellCommand {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Capabilities reported by the driver when the session started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCapabilities {
    /// Screen density in dpi
    #[serde(default)]
    pub device_screen_density: Option<f64>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
}

impl SessionCapabilities {
    /// Read capabilities from a session handshake.
    ///
    /// Accepts `[session_id, capabilities]` or a bare capabilities object.
    /// Anything else yields empty capabilities.
    pub fn from_handshake(handshake: &Value) -> Self {
        let caps = match handshake {
            Value::Array(items) => items.get(1),
            Value::Object(_) => Some(handshake),
            _ => None,
        };

        match caps.map(|c| serde_json::from_value(c.clone())) {
            Some(Ok(caps)) => caps,
            Some(Err(e)) => {
                debug!("Unreadable session capabilities: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Density reported by the session, already scaled
    pub fn density(&self) -> Option<f64> {
        self.device_screen_density
            .filter(|dpi| *dpi > 0.0)
            .map(density_from_dpi)
    }
}

/// Render a shell result returned by the driver as text
pub fn shell_output(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
