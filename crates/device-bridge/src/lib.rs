//! Runway Device Bridge
//!
//! Device descriptors and the seams to the outside world: the device
//! inventory that boots and kills targets, and the live driver of a
//! running automation session.

pub mod device;
pub mod driver;
pub mod inventory;
pub mod screen;

pub use device::{
    normalize_token, Device, DeviceFilter, DeviceKind, DeviceStatus, DisplayConfig, Platform,
    UnknownPlatform,
};
pub use driver::{DriverError, LiveDriver, SessionCapabilities, ShellCommand};
pub use inventory::{DeviceInventory, InventoryError};
pub use screen::ScreenInfo;
