//! Runway Device Manager
//!
//! Selects, boots, reuses and tears down the device a UI test run executes
//! on, and works out the display metrics gesture code needs.
//!
//! ```ignore
//! let manager = DeviceManager::new(inventory);
//! let spec = TargetSpec::new(Platform::Android, "Pixel_4").with_version("11");
//!
//! if let Selection::Ready(mut device) = manager.start_device(&spec).await? {
//!     manager.resolve_density(&spec, &mut device, &driver).await;
//!     // drive the test session
//!     manager.stop_device(&spec).await?;
//! }
//! ```

pub mod manager;
pub mod metrics;
pub mod platform;
pub mod registry;
pub mod selector;
pub mod shell;
pub mod target;

#[cfg(test)]
mod testing;

pub use manager::DeviceManager;
pub use metrics::DisplayMetricsResolver;
pub use platform::{AndroidStrategy, IosStrategy, Lifecycle, PlatformStrategy, PlatformTable};
pub use registry::SessionRegistry;
pub use selector::{DeviceSelector, NotFound, NotFoundReason, Selection};
pub use target::TargetSpec;
