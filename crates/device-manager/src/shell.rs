//! Raw shell commands through the live driver

use serde_json::Value;
use tracing::debug;

use runway_core::Result;
use runway_device_bridge::driver::SHELL_SCRIPT;
use runway_device_bridge::{LiveDriver, Platform, ShellCommand};

/// Run a shell command on the device behind `driver`.
///
/// Only Android sessions expose a shell; other platforms yield `None`.
pub async fn execute_shell_command(
    driver: &dyn LiveDriver,
    command: &ShellCommand,
) -> Result<Option<Value>> {
    if driver.platform() != Platform::Android {
        return Ok(None);
    }

    debug!("shell {} {:?}", command.command, command.args);
    let args = serde_json::to_value(command)?;
    let output = driver.execute(SHELL_SCRIPT, args).await?;
    Ok(Some(output))
}
