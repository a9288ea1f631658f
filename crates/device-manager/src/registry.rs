//! Session Registry
//!
//! Remembers which device was handed to which run lane so teardown can
//! find it again. Bindings are overwritten, never removed.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use runway_device_bridge::Device;

/// Run lane to device mapping
#[derive(Debug, Default)]
pub struct SessionRegistry {
    bindings: RwLock<HashMap<String, Device>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a device to a run lane, returning the device it replaces
    pub fn bind(&self, run_type: &str, device: Device) -> Option<Device> {
        debug!("Binding {} to run type {}", device, run_type);
        self.bindings.write().insert(run_type.to_string(), device)
    }

    pub fn lookup(&self, run_type: &str) -> Option<Device> {
        self.bindings.read().get(run_type).cloned()
    }

    pub fn contains(&self, run_type: &str) -> bool {
        self.bindings.read().contains_key(run_type)
    }

    pub fn run_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.bindings.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}
