#![allow(clippy::unwrap_used)]
// Failover behavior of `ControllerManager` against in-memory adapters.
//
// Every test runs on a paused clock, so timer ticks and probe timeouts
// resolve instantly once the runtime goes idle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use trident_core::{
    ControllerAdapter, ControllerKind, ControllerManager, CoreError, DeviceStatus,
    FailoverSettings, ManagerConfig, ManagerState, NetworkDevice, NetworkFlow, NetworkStats,
    QosPolicy,
};

const INTERVAL: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ── Mock adapter ────────────────────────────────────────────────────

struct MockAdapter {
    kind: ControllerKind,
    healthy: AtomicBool,
    connect_fails: AtomicBool,
    stats_fail: AtomicBool,
    hangs: AtomicBool,
    /// `get_devices` parks on `release` while set.
    gated: AtomicBool,
    release: Notify,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    probes: AtomicUsize,
    qos_applied: AtomicUsize,
}

impl MockAdapter {
    fn new(kind: ControllerKind, healthy: bool) -> Arc<Self> {
        Arc::new(Self {
            kind,
            healthy: AtomicBool::new(healthy),
            connect_fails: AtomicBool::new(false),
            stats_fail: AtomicBool::new(false),
            hangs: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            release: Notify::new(),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            qos_applied: AtomicUsize::new(0),
        })
    }

    fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl ControllerAdapter for MockAdapter {
    fn kind(&self) -> ControllerKind {
        self.kind
    }

    async fn connect(&self) -> Result<(), trident_api::Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.connect_fails.load(Ordering::SeqCst) {
            return Err(trident_api::Error::Authentication {
                message: "bad credentials".into(),
            });
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn get_devices(&self) -> Result<Vec<NetworkDevice>, trident_api::Error> {
        if self.gated.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        // The device id names the adapter that served the call.
        Ok(vec![NetworkDevice {
            id: self.kind.to_string(),
            name: "probe".into(),
            device_type: "switch".into(),
            ip_address: "unknown".into(),
            status: DeviceStatus::Online,
            last_seen: Utc::now(),
        }])
    }

    async fn get_flows(&self) -> Result<Vec<NetworkFlow>, trident_api::Error> {
        Ok(Vec::new())
    }

    async fn get_stats(&self) -> Result<NetworkStats, trident_api::Error> {
        if self.stats_fail.load(Ordering::SeqCst) {
            return Err(trident_api::Error::Api {
                status: 502,
                message: "bad gateway".into(),
            });
        }
        Ok(NetworkStats::empty())
    }

    async fn apply_qos_policy(&self, _policy: &QosPolicy) -> Result<(), trident_api::Error> {
        self.qos_applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.healthy.load(Ordering::SeqCst)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn settings() -> FailoverSettings {
    FailoverSettings {
        check_interval: INTERVAL,
        health_check_timeout: PROBE_TIMEOUT,
    }
}

fn manager(adapters: &[Arc<MockAdapter>]) -> ControllerManager {
    let adapters = adapters
        .iter()
        .map(|a| Arc::clone(a) as Arc<dyn ControllerAdapter>)
        .collect();
    ControllerManager::with_adapters(adapters, settings())
}

/// A/B/C in default order: SDN (healthy), firewall (healthy), router (down).
fn scenario() -> [Arc<MockAdapter>; 3] {
    [
        MockAdapter::new(ControllerKind::SdnController, true),
        MockAdapter::new(ControllerKind::FirewallAppliance, true),
        MockAdapter::new(ControllerKind::RouterOs, false),
    ]
}

/// Let the failover task run exactly one tick.
async fn next_tick() {
    tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;
}

async fn served_by(manager: &ControllerManager) -> String {
    manager.get_devices().await.unwrap()[0].id.clone()
}

// ── Selection ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_in_flight_call_completes_on_superseded_adapter() {
    let adapters = scenario();
    adapters[0].gated.store(true, Ordering::SeqCst);
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    let call = tokio::spawn({
        let manager = manager.clone();
        async move { manager.get_devices().await }
    });
    tokio::task::yield_now().await;

    // A fails while the call is parked inside it; the tick moves to B.
    adapters[0].set_healthy(false);
    next_tick().await;
    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );
    assert!(!call.is_finished());

    adapters[0].release.notify_one();
    let devices = call.await.unwrap().unwrap();
    assert_eq!(devices[0].id, "sdn-controller");
    assert_eq!(served_by(&manager).await, "firewall-appliance");

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_connect_selects_first_healthy_in_order() {
    let adapters = scenario();
    adapters[0].set_healthy(false);
    let manager = manager(&adapters);

    manager.connect().await.unwrap();

    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );
    assert_eq!(
        manager.state(),
        ManagerState::Active(ControllerKind::FirewallAppliance)
    );
    for adapter in &adapters {
        assert_eq!(adapter.connects.load(Ordering::SeqCst), 1);
    }
    // Selection stops at the first healthy adapter.
    assert_eq!(adapters[2].probes.load(Ordering::SeqCst), 0);

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_failover_walks_configured_order() {
    let adapters = scenario();
    let manager = manager(&adapters);
    manager.connect().await.unwrap();
    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));
    assert_eq!(served_by(&manager).await, "sdn-controller");

    // A goes down: B takes over, not C.
    adapters[0].set_healthy(false);
    next_tick().await;
    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );
    assert_eq!(served_by(&manager).await, "firewall-appliance");

    // B goes down too: nothing is left.
    adapters[1].set_healthy(false);
    next_tick().await;
    assert_eq!(manager.active_kind(), None);
    assert_eq!(manager.state(), ManagerState::NoActiveAvailable);
    assert!(matches!(
        manager.get_devices().await,
        Err(CoreError::NoActiveController)
    ));

    let status = manager.status().await;
    assert_eq!(status.len(), 3);
    assert!(status.iter().all(|s| !s.active && !s.healthy));

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_tick_only_probes_active_adapter() {
    let adapters = scenario();
    let manager = manager(&adapters);
    manager.connect().await.unwrap();
    let before = adapters[1].probes.load(Ordering::SeqCst);

    next_tick().await;

    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));
    assert_eq!(adapters[1].probes.load(Ordering::SeqCst), before);

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_recovers_when_adapter_returns() {
    let adapters = scenario();
    for adapter in &adapters {
        adapter.set_healthy(false);
    }
    adapters[2].set_healthy(true);
    let manager = manager(&adapters);
    manager.connect().await.unwrap();
    assert_eq!(manager.active_kind(), Some(ControllerKind::RouterOs));

    adapters[2].set_healthy(false);
    next_tick().await;
    assert_eq!(manager.active_kind(), None);

    // With nothing active, the next tick runs full selection.
    adapters[1].set_healthy(true);
    next_tick().await;
    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_failback_until_active_fails() {
    let adapters = scenario();
    adapters[0].set_healthy(false);
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    adapters[0].set_healthy(true);
    next_tick().await;
    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );

    // An explicit reselect restores priority order.
    let kind = manager.reselect().await.unwrap();
    assert_eq!(kind, Some(ControllerKind::SdnController));
    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_hung_probe_counts_as_unhealthy() {
    let adapters = scenario();
    adapters[0].hangs.store(true, Ordering::SeqCst);
    let manager = manager(&adapters);

    let started = tokio::time::Instant::now();
    manager.connect().await.unwrap();

    assert_eq!(
        manager.active_kind(),
        Some(ControllerKind::FirewallAppliance)
    );
    assert!(started.elapsed() >= PROBE_TIMEOUT);

    manager.disconnect().await;
}

// ── Delegation ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_call_failure_does_not_fail_over() {
    let adapters = scenario();
    adapters[0].stats_fail.store(true, Ordering::SeqCst);
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    match manager.get_stats().await {
        Err(CoreError::VendorApi { kind, source }) => {
            assert_eq!(kind, ControllerKind::SdnController);
            assert_eq!(source.status(), Some(502));
        }
        other => panic!("expected VendorApi error, got: {other:?}"),
    }
    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_qos_goes_to_active_adapter_only() {
    let adapters = scenario();
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    let policy: QosPolicy = serde_json::from_value(serde_json::json!({
        "id": "p1",
        "name": "voice",
        "targetDevice": "openflow:1",
        "bandwidth": { "min": 1, "max": 10 },
        "priority": 1
    }))
    .unwrap();
    manager.apply_qos_policy(&policy).await.unwrap();

    assert_eq!(adapters[0].qos_applied.load(Ordering::SeqCst), 1);
    assert_eq!(adapters[1].qos_applied.load(Ordering::SeqCst), 0);
    assert!(manager.health_check().await.unwrap());

    manager.disconnect().await;
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_empty_manager_has_no_active_controller() {
    let manager = ControllerManager::new(&ManagerConfig::default()).unwrap();
    assert!(manager.kinds().is_empty());

    assert!(matches!(
        manager.connect().await,
        Err(CoreError::NoActiveController)
    ));
    assert!(matches!(
        manager.get_flows().await,
        Err(CoreError::NoActiveController)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_connect_fails_when_nothing_is_healthy() {
    let adapters = scenario();
    adapters[0].set_healthy(false);
    adapters[1].set_healthy(false);
    adapters[1].connect_fails.store(true, Ordering::SeqCst);
    let manager = manager(&adapters);

    match manager.connect().await {
        Err(CoreError::Connection { failures }) => {
            assert_eq!(failures.len(), 3);
            assert_eq!(failures[0].kind, ControllerKind::FirewallAppliance);
            assert!(failures[0].reason.contains("bad credentials"));
        }
        other => panic!("expected Connection error, got: {other:?}"),
    }
    assert_eq!(manager.state(), ManagerState::Disconnected);
    assert_eq!(manager.active_kind(), None);
    assert!(adapters.iter().all(|a| a.disconnects.load(Ordering::SeqCst) == 1));
}

#[tokio::test(start_paused = true)]
async fn test_failed_connect_still_takes_part_in_selection() {
    let adapters = scenario();
    adapters[0].connect_fails.store(true, Ordering::SeqCst);
    let manager = manager(&adapters);

    manager.connect().await.unwrap();
    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_connect_is_idempotent() {
    let adapters = scenario();
    let manager = manager(&adapters);

    manager.connect().await.unwrap();
    manager.connect().await.unwrap();

    assert_eq!(adapters[0].connects.load(Ordering::SeqCst), 1);
    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_clears_active_and_stops_timer() {
    let adapters = scenario();
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    manager.disconnect().await;

    assert_eq!(manager.active_kind(), None);
    assert_eq!(manager.state(), ManagerState::Disconnected);
    assert!(adapters.iter().all(|a| a.disconnects.load(Ordering::SeqCst) == 1));
    assert!(matches!(
        manager.reselect().await,
        Err(CoreError::NotConnected)
    ));

    let probes = adapters[0].probes.load(Ordering::SeqCst);
    next_tick().await;
    assert_eq!(adapters[0].probes.load(Ordering::SeqCst), probes);

    // A disconnected manager can be brought back up.
    manager.connect().await.unwrap();
    assert_eq!(manager.active_kind(), Some(ControllerKind::SdnController));
    manager.disconnect().await;
}

// ── Observation ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_failover_events_report_identity_changes() {
    let adapters = scenario();
    let manager = manager(&adapters);
    let mut events = manager.subscribe_failovers();

    manager.connect().await.unwrap();
    let initial = events.recv().await.unwrap();
    assert_eq!(initial.from, None);
    assert_eq!(initial.to, Some(ControllerKind::SdnController));

    // A healthy tick changes nothing and emits nothing.
    next_tick().await;
    assert!(events.try_recv().is_err());

    adapters[0].set_healthy(false);
    next_tick().await;
    let failover = events.recv().await.unwrap();
    assert_eq!(failover.from, Some(ControllerKind::SdnController));
    assert_eq!(failover.to, Some(ControllerKind::FirewallAppliance));

    manager.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_fresh_probe_per_adapter() {
    let adapters = scenario();
    let manager = manager(&adapters);
    manager.connect().await.unwrap();

    let status = manager.status().await;
    let rows: Vec<_> = status.iter().map(|s| (s.kind, s.healthy, s.active)).collect();
    assert_eq!(
        rows,
        [
            (ControllerKind::SdnController, true, true),
            (ControllerKind::FirewallAppliance, true, false),
            (ControllerKind::RouterOs, false, false),
        ]
    );

    manager.disconnect().await;
}
