//! Event System
//!
//! Provides a pub/sub event bus for device lifecycle notifications.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use runway_device_bridge::{Device, DisplayConfig, Platform};

/// Events emitted while selecting and tearing down devices
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A shut down device was booted
    DeviceStarted { device: Device },
    /// A running physical device was killed and booted again
    DeviceRestarted { device: Device },
    /// A device was shut down
    DeviceKilled { device: Device },
    /// A device was bound to a run lane
    DeviceBound { run_type: String, device: Device },
    /// Nothing matched the request
    DeviceNotFound { platform: Platform, requested: String },
    /// Display metrics were resolved for a device
    MetricsResolved { device_name: String, config: DisplayConfig },
}

/// Subscriber handle for receiving events
#[derive(Clone)]
pub struct EventSubscription {
    receiver: Receiver<DeviceEvent>,
}

impl EventSubscription {
    /// Receive the next event (blocking)
    pub fn recv(&self) -> Result<DeviceEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Result<DeviceEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything received so far
    pub fn drain(&self) -> Vec<DeviceEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Event bus for publish/subscribe pattern
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<DeviceEvent>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        EventSubscription { receiver }
    }

    /// Emit an event to all subscribers, returns how many received it
    pub fn emit(&self, event: DeviceEvent) -> usize {
        let subscribers = self.subscribers.read();
        let mut delivered = 0;

        for sender in subscribers.iter() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        debug!("Event {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
