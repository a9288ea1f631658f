//! Runway - test device selection and lifecycle
//!
//! Picks the emulator, simulator or physical device a mobile UI test run
//! executes on, boots or reuses it, tears it down afterwards and derives
//! the display metrics needed to turn logical coordinates into taps.
//!
//! ## Architecture
//!
//! - `runway-core`: configuration, errors and lifecycle events
//! - `runway-device-bridge`: device descriptors, the inventory and driver seams
//! - `runway-device-manager`: selection, session registry and display metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;

pub use logging::init_logging;

// Re-export main components for library usage
pub use runway_core as core;
pub use runway_device_bridge as bridge;
pub use runway_device_manager as manager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use runway_core::{HarnessConfig, PolicyConfig, RunwayError};
    pub use runway_device_bridge::{
        Device, DeviceInventory, DeviceKind, DeviceStatus, LiveDriver, Platform,
    };
    pub use runway_device_manager::{DeviceManager, Selection, TargetSpec};
}
