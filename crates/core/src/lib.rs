//! Runway Core - configuration, errors and lifecycle events
//!
//! Shared by the device manager and by harnesses embedding it.

pub mod config;
pub mod error;
pub mod events;

pub use config::{EnvOverride, HarnessConfig, OverrideConfig, PolicyConfig};
pub use error::{Result, RunwayError};
pub use events::{DeviceEvent, EventBus, EventSubscription};

/// Runway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
