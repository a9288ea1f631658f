//! Device Selector
//!
//! Picks one device for a [`TargetSpec`] and brings it up:
//! 1. an environment-injected token wins over everything, the device is
//!    handed out as the inventory reports it
//! 2. remote lab / ignored inventory: a descriptor is synthesized from the
//!    request, nothing is looked up
//! 3. otherwise the inventory is searched, a candidate picked by status
//!    preference, and booted or cycled as the platform strategy decides
//!
//! Paths 2 and 3 always leave a binding for the run lane. When nothing
//! usable is found the requested descriptor is bound, so a later teardown
//! never reaches the device of an earlier run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use runway_core::{DeviceEvent, EventBus, Result};
use runway_device_bridge::{normalize_token, Device, DeviceFilter, DeviceInventory};

use crate::platform::{pick_candidate, Lifecycle, PlatformTable};
use crate::registry::SessionRegistry;
use crate::target::TargetSpec;

/// Why nothing was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The environment named a token the inventory does not know
    UnknownOverrideToken,
    /// No device matched the name/version or udid
    NoMatchingDevice,
    /// Devices matched, but none is shut down or booted
    NoUsableCandidate,
}

/// Details of an unsuccessful selection
#[derive(Debug, Clone)]
pub struct NotFound {
    pub reason: NotFoundReason,
    pub requested: String,
    /// Everything the inventory offered for the platform
    pub available: Vec<Device>,
}

/// Outcome of a selection
#[derive(Debug, Clone)]
pub enum Selection {
    Ready(Device),
    NotFound(NotFound),
}

impl Selection {
    pub fn is_ready(&self) -> bool {
        matches!(self, Selection::Ready(_))
    }

    pub fn device(&self) -> Option<&Device> {
        match self {
            Selection::Ready(device) => Some(device),
            Selection::NotFound(_) => None,
        }
    }

    pub fn into_device(self) -> Option<Device> {
        match self {
            Selection::Ready(device) => Some(device),
            Selection::NotFound(_) => None,
        }
    }
}

pub struct DeviceSelector {
    inventory: Arc<dyn DeviceInventory>,
    registry: Arc<SessionRegistry>,
    strategies: Arc<PlatformTable>,
    events: Arc<EventBus>,
}

impl DeviceSelector {
    pub fn new(
        inventory: Arc<dyn DeviceInventory>,
        registry: Arc<SessionRegistry>,
        strategies: Arc<PlatformTable>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            inventory,
            registry,
            strategies,
            events,
        }
    }

    /// Select a device for `spec` and bring it into a running state.
    ///
    /// Only collaborator failures are errors; finding nothing is a
    /// [`Selection::NotFound`].
    pub async fn select_and_start(&self, spec: &TargetSpec) -> Result<Selection> {
        if let Some(token) = spec.env_override.token.as_deref() {
            return self.select_override(spec, token).await;
        }

        if spec.skips_inventory() {
            let device = spec.default_device();
            info!("Inventory is skipped, using {} as requested", device);
            self.bind(spec, device.clone());
            return Ok(Selection::Ready(device));
        }

        let strategy = self.strategies.get(spec.platform)?;
        let all = self.inventory.devices(spec.platform).await?;
        if all.is_empty() {
            warn!(
                "No {} devices found. Proceeding anyway, is the emulator/simulator tooling installed?",
                spec.platform
            );
        }

        let candidates = spec.search_filter().apply(&all);
        if candidates.is_empty() {
            warn!(
                "No such device {}! Available devices: {}",
                spec.requested(),
                describe(&all)
            );
            self.bind(spec, spec.default_device());
            return Ok(self.not_found(spec, NotFoundReason::NoMatchingDevice, all));
        }

        let reuse = spec.policy.reuse_device;
        let Some(candidate) = pick_candidate(&candidates, &strategy.preferred_statuses(reuse)) else {
            warn!(
                "No shut down or booted device among {}",
                describe(&candidates)
            );
            self.bind(spec, spec.default_device());
            return Ok(self.not_found(spec, NotFoundReason::NoUsableCandidate, all));
        };

        let (device, lifecycle) = strategy
            .start_or_restart(self.inventory.as_ref(), candidate, reuse)
            .await?;

        let event = match lifecycle {
            Lifecycle::Started => Some(DeviceEvent::DeviceStarted {
                device: device.clone(),
            }),
            Lifecycle::Restarted => Some(DeviceEvent::DeviceRestarted {
                device: device.clone(),
            }),
            Lifecycle::Reused => None,
        };
        if let Some(event) = event {
            self.events.emit(event);
        }

        self.bind(spec, device.clone());
        Ok(Selection::Ready(device))
    }

    /// The environment injected a device token, hand out that device as is
    async fn select_override(&self, spec: &TargetSpec, token: &str) -> Result<Selection> {
        let mut wanted = spec.default_device().with_token(token);
        if let Some(ref name) = spec.env_override.name {
            wanted.name = name.clone();
        }
        debug!("Device injected by the environment: {}", wanted);

        let all = self.inventory.devices(wanted.platform).await?;
        match DeviceFilter::token(normalize_token(token)).first(&all) {
            Some(device) => {
                info!("Device: {}", device);
                Ok(Selection::Ready(device))
            }
            None => {
                warn!(
                    "Injected device token {} is unknown. Available devices: {}",
                    token,
                    describe(&all)
                );
                Ok(self.not_found(spec, NotFoundReason::UnknownOverrideToken, all))
            }
        }
    }

    fn bind(&self, spec: &TargetSpec, device: Device) {
        self.registry.bind(&spec.run_type, device.clone());
        self.events.emit(DeviceEvent::DeviceBound {
            run_type: spec.run_type.clone(),
            device,
        });
    }

    fn not_found(&self, spec: &TargetSpec, reason: NotFoundReason, available: Vec<Device>) -> Selection {
        self.events.emit(DeviceEvent::DeviceNotFound {
            platform: spec.platform,
            requested: spec.requested(),
        });
        Selection::NotFound(NotFound {
            reason,
            requested: spec.requested(),
            available,
        })
    }
}

fn describe(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "none".to_string();
    }
    devices
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockInventory};
    use runway_core::{EnvOverride, PolicyConfig};
    use runway_device_bridge::{DeviceKind, DeviceStatus, Platform};

    fn android(name: &str, token: &str, kind: DeviceKind, status: DeviceStatus) -> Device {
        Device::new(name, Some("11".into()), Platform::Android)
            .with_token(token)
            .with_kind(kind)
            .with_status(status)
    }

    struct Fixture {
        inventory: Arc<MockInventory>,
        registry: Arc<SessionRegistry>,
        selector: DeviceSelector,
    }

    fn fixture(devices: Vec<Device>) -> Fixture {
        let inventory = Arc::new(MockInventory::new(devices));
        let registry = Arc::new(SessionRegistry::new());
        let selector = DeviceSelector::new(
            inventory.clone(),
            registry.clone(),
            Arc::new(PlatformTable::standard()),
            Arc::new(EventBus::new()),
        );
        Fixture {
            inventory,
            registry,
            selector,
        }
    }

    fn pixel_spec() -> TargetSpec {
        TargetSpec::new(Platform::Android, "Pixel_4").with_version("11")
    }

    #[tokio::test]
    async fn test_prefers_shutdown_without_reuse() {
        let f = fixture(vec![
            android("Pixel_4", "5554", DeviceKind::Emulator, DeviceStatus::Booted),
            android("Pixel_4", "5556", DeviceKind::Emulator, DeviceStatus::Shutdown),
        ]);

        let device = f.selector.select_and_start(&pixel_spec()).await.unwrap().into_device().unwrap();

        assert_eq!(device.token.as_deref(), Some("5556"));
        assert!(device.is_booted());
        assert_eq!(f.inventory.starts(), vec!["5556".to_string()]);
        assert!(f.inventory.kills().is_empty());
    }

    #[tokio::test]
    async fn test_reuses_booted_device() {
        let f = fixture(vec![android(
            "Pixel_4",
            "5554",
            DeviceKind::Physical,
            DeviceStatus::Booted,
        )]);
        let spec = pixel_spec().reuse_device(true);

        let selection = f.selector.select_and_start(&spec).await.unwrap();

        assert_eq!(selection.device().and_then(|d| d.token.as_deref()), Some("5554"));
        assert!(f.inventory.starts().is_empty());
        assert!(f.inventory.kills().is_empty());
    }

    #[tokio::test]
    async fn test_reuse_falls_back_to_shutdown() {
        let f = fixture(vec![android(
            "Pixel_4",
            "5554",
            DeviceKind::Emulator,
            DeviceStatus::Shutdown,
        )]);

        let selection = f.selector.select_and_start(&pixel_spec().reuse_device(true)).await.unwrap();

        assert!(selection.device().unwrap().is_booted());
        assert_eq!(f.inventory.starts(), vec!["5554".to_string()]);
    }

    #[tokio::test]
    async fn test_booted_physical_device_is_cycled() {
        let f = fixture(vec![android(
            "Pixel_4",
            "R58M",
            DeviceKind::Physical,
            DeviceStatus::Booted,
        )]);

        f.selector.select_and_start(&pixel_spec()).await.unwrap();

        assert_eq!(
            f.inventory.lifecycle_calls(),
            vec![Call::Kill("R58M".into()), Call::Start("R58M".into())]
        );
    }

    #[tokio::test]
    async fn test_booted_emulator_is_left_running() {
        let booted = android("Pixel_4", "5554", DeviceKind::Emulator, DeviceStatus::Booted);
        let f = fixture(vec![booted.clone()]);

        let selection = f.selector.select_and_start(&pixel_spec()).await.unwrap();

        assert_eq!(selection.into_device(), Some(booted));
        assert!(f.inventory.lifecycle_calls().is_empty());
    }

    fn ios(name: &str, udid: &str, kind: DeviceKind, status: DeviceStatus) -> Device {
        Device::new(name, Some("13.2".into()), Platform::Ios)
            .with_token(udid)
            .with_kind(kind)
            .with_status(status)
    }

    fn iphone_spec() -> TargetSpec {
        TargetSpec::new(Platform::Ios, "iPhone 11").with_version("13.2")
    }

    #[tokio::test]
    async fn test_booted_simulator_is_left_running() {
        let booted = ios("iPhone 11", "A1B2", DeviceKind::Simulator, DeviceStatus::Booted);
        let f = fixture(vec![booted.clone()]);

        let selection = f.selector.select_and_start(&iphone_spec()).await.unwrap();

        assert_eq!(selection.into_device(), Some(booted.clone()));
        assert!(f.inventory.lifecycle_calls().is_empty());
        assert_eq!(f.registry.lookup("default"), Some(booted));
    }

    #[tokio::test]
    async fn test_booted_real_device_is_cycled() {
        let f = fixture(vec![ios(
            "iPhone 11",
            "00008030",
            DeviceKind::Real,
            DeviceStatus::Booted,
        )]);

        let device = f.selector.select_and_start(&iphone_spec()).await.unwrap().into_device().unwrap();

        assert!(device.is_booted());
        assert_eq!(
            f.inventory.lifecycle_calls(),
            vec![Call::Kill("00008030".into()), Call::Start("00008030".into())]
        );
    }

    #[tokio::test]
    async fn test_skipped_inventory_synthesizes_device() {
        for policy in [
            PolicyConfig {
                remote_lab: true,
                ..Default::default()
            },
            PolicyConfig {
                ignore_inventory: true,
                ..Default::default()
            },
        ] {
            let f = fixture(vec![android(
                "Pixel_4",
                "5554",
                DeviceKind::Emulator,
                DeviceStatus::Shutdown,
            )]);
            let spec = pixel_spec().with_run_type("lab").with_policy(policy);

            let device = f.selector.select_and_start(&spec).await.unwrap().into_device().unwrap();

            assert_eq!(device, spec.default_device());
            assert_eq!(f.registry.lookup("lab"), Some(device));
            assert!(f.inventory.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_env_override_wins() {
        let f = fixture(vec![
            android("Pixel_4", "5554", DeviceKind::Emulator, DeviceStatus::Shutdown),
            android("Nexus_5", "5556", DeviceKind::Emulator, DeviceStatus::Shutdown),
        ]);
        let spec = pixel_spec()
            .with_policy(PolicyConfig {
                remote_lab: true,
                ..Default::default()
            })
            .with_env_override(EnvOverride {
                token: Some("emulator-5556".into()),
                name: Some("Injected".into()),
            });

        let device = f.selector.select_and_start(&spec).await.unwrap().into_device().unwrap();

        // handed out verbatim: not booted, not bound
        assert_eq!(device.name, "Nexus_5");
        assert!(device.is_shutdown());
        assert_eq!(f.inventory.calls(), vec![Call::Devices(Platform::Android)]);
        assert!(f.registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_override_token() {
        let f = fixture(vec![android("Pixel_4", "5554", DeviceKind::Emulator, DeviceStatus::Booted)]);
        let spec = pixel_spec().with_env_override(EnvOverride {
            token: Some("emulator-9999".into()),
            name: None,
        });

        match f.selector.select_and_start(&spec).await.unwrap() {
            Selection::NotFound(nf) => {
                assert_eq!(nf.reason, NotFoundReason::UnknownOverrideToken);
                assert_eq!(nf.available.len(), 1);
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let f = fixture(vec![android("Nexus_5", "5554", DeviceKind::Emulator, DeviceStatus::Booted)]);
        f.registry.bind("default", android("Pixel_4", "5556", DeviceKind::Emulator, DeviceStatus::Booted));

        let selection = f.selector.select_and_start(&pixel_spec()).await.unwrap();

        match selection {
            Selection::NotFound(nf) => {
                assert_eq!(nf.reason, NotFoundReason::NoMatchingDevice);
                assert_eq!(nf.requested, "Pixel_4 11");
            }
            other => panic!("unexpected selection {:?}", other),
        }
        // the stale binding of the earlier run is replaced by the request
        assert_eq!(f.registry.lookup("default"), Some(pixel_spec().default_device()));
        assert!(f.inventory.lifecycle_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_candidate() {
        let f = fixture(vec![android(
            "Pixel_4",
            "5554",
            DeviceKind::Emulator,
            DeviceStatus::Other("Busy".into()),
        )]);

        let selection = f.selector.select_and_start(&pixel_spec()).await.unwrap();
        assert!(matches!(
            selection,
            Selection::NotFound(NotFound {
                reason: NotFoundReason::NoUsableCandidate,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_udid_selects_by_token() {
        let f = fixture(vec![
            android("Pixel_4", "5554", DeviceKind::Emulator, DeviceStatus::Shutdown),
            android("Pixel_4", "5556", DeviceKind::Emulator, DeviceStatus::Shutdown),
        ]);
        let spec = TargetSpec::new(Platform::Android, "ignored").with_udid("5556");

        let device = f.selector.select_and_start(&spec).await.unwrap().into_device().unwrap();
        assert_eq!(device.token.as_deref(), Some("5556"));
    }

    #[tokio::test]
    async fn test_inventory_failure_is_an_error() {
        let f = fixture(vec![]);
        f.inventory.fail_enumeration();

        let err = f.selector.select_and_start(&pixel_spec()).await.unwrap_err();
        assert!(err.is_external());
    }
}
