// ── Controller manager ──
//
// Owns the fixed adapter set and the single active pointer. Readers load
// the pointer lock-free; only `connect`, `disconnect` and the failover
// task ever store it. The failover task is the one place health probes
// run on a schedule, so probes never overlap.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use trident_api::TransportConfig;

use crate::adapter::{
    ControllerAdapter, ControllerKind, FirewallAdapter, RouterOsAdapter, SdnControllerAdapter,
};
use crate::config::{DEFAULT_FAILOVER_CHECK_INTERVAL, DEFAULT_HEALTH_CHECK_TIMEOUT, ManagerConfig};
use crate::error::{AdapterFailure, CoreError};
use crate::model::{NetworkDevice, NetworkFlow, NetworkStats, QosPolicy};

const REQUEST_CHANNEL_SIZE: usize = 8;
const FAILOVER_CHANNEL_SIZE: usize = 64;

// ── Observable state ─────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagerState {
    Disconnected,
    Connecting,
    Active(ControllerKind),
    /// Connected, but the last selection found no healthy adapter.
    NoActiveAvailable,
}

/// Emitted whenever the active adapter changes identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverEvent {
    pub from: Option<ControllerKind>,
    pub to: Option<ControllerKind>,
    pub at: DateTime<Utc>,
}

/// One row of [`ControllerManager::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterStatus {
    pub kind: ControllerKind,
    pub healthy: bool,
    pub active: bool,
}

/// Timer and probe settings for the failover task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailoverSettings {
    pub check_interval: Duration,
    /// Probes that take longer count as unhealthy.
    pub health_check_timeout: Duration,
}

impl Default for FailoverSettings {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_FAILOVER_CHECK_INTERVAL,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
        }
    }
}

impl From<&ManagerConfig> for FailoverSettings {
    fn from(config: &ManagerConfig) -> Self {
        Self {
            check_interval: config.failover_check_interval,
            health_check_timeout: config.health_check_timeout,
        }
    }
}

/// The adapter currently serving delegated calls.
///
/// `index` is the adapter's position in configured order and is what
/// identity comparisons use.
pub struct ActiveController {
    pub index: usize,
    pub kind: ControllerKind,
    pub adapter: Arc<dyn ControllerAdapter>,
}

impl fmt::Debug for ActiveController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveController")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

enum ManagerRequest {
    Reselect {
        reply: oneshot::Sender<Option<ControllerKind>>,
    },
}

// ── ControllerManager ────────────────────────────────────────────

/// Failover front for a fixed, ordered set of controller adapters.
///
/// Cheaply cloneable via `Arc<ManagerInner>`. At most one adapter is
/// active at a time; every delegated query goes to whichever adapter is
/// active at the instant the call starts. A call already in flight when
/// the failover task swaps the pointer completes against the old adapter.
#[derive(Clone)]
pub struct ControllerManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    adapters: Vec<Arc<dyn ControllerAdapter>>,
    settings: FailoverSettings,
    active: ArcSwapOption<ActiveController>,
    state: watch::Sender<ManagerState>,
    failover_tx: broadcast::Sender<FailoverEvent>,
    request_tx: Mutex<Option<mpsc::Sender<ManagerRequest>>>,
    /// Cancelled on disconnect, replaced on the next connect.
    cancel: Mutex<CancellationToken>,
    /// Doubles as the lifecycle lock: `connect` and `disconnect` hold it
    /// for their whole duration.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ControllerManager {
    /// Build one adapter per configured backend, in failover order.
    ///
    /// Does NOT connect. Call [`connect()`](Self::connect) to bring the
    /// adapters up and start the failover task.
    pub fn new(config: &ManagerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.request_timeout,
            ..TransportConfig::default()
        };

        let mut adapters: Vec<Arc<dyn ControllerAdapter>> = Vec::new();
        for kind in config.configured_kinds() {
            let adapter: Arc<dyn ControllerAdapter> = match kind {
                ControllerKind::SdnController => match config.sdn_controller {
                    Some(ref c) => Arc::new(SdnControllerAdapter::new(c, &transport)?),
                    None => continue,
                },
                ControllerKind::FirewallAppliance => match config.firewall_appliance {
                    Some(ref c) => Arc::new(FirewallAdapter::new(c, &transport)?),
                    None => continue,
                },
                ControllerKind::RouterOs => match config.router_os {
                    Some(ref c) => Arc::new(RouterOsAdapter::new(c, &transport)?),
                    None => continue,
                },
            };
            adapters.push(adapter);
        }

        Ok(Self::with_adapters(adapters, FailoverSettings::from(config)))
    }

    /// Wrap prebuilt adapters. Their order is the selection priority.
    pub fn with_adapters(
        adapters: Vec<Arc<dyn ControllerAdapter>>,
        mut settings: FailoverSettings,
    ) -> Self {
        if settings.check_interval.is_zero() {
            warn!("failover check interval is zero, using default");
            settings.check_interval = DEFAULT_FAILOVER_CHECK_INTERVAL;
        }
        let (state, _) = watch::channel(ManagerState::Disconnected);
        let (failover_tx, _) = broadcast::channel(FAILOVER_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ManagerInner {
                adapters,
                settings,
                active: ArcSwapOption::empty(),
                state,
                failover_tx,
                request_tx: Mutex::new(None),
                cancel: Mutex::new(CancellationToken::new()),
                task: Mutex::new(None),
            }),
        }
    }

    /// Configured adapter kinds, in selection order.
    pub fn kinds(&self) -> Vec<ControllerKind> {
        self.inner.adapters.iter().map(|a| a.kind()).collect()
    }

    pub fn settings(&self) -> FailoverSettings {
        self.inner.settings
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect every adapter concurrently, select the first healthy one,
    /// and start the failover task.
    ///
    /// Individual connect failures are logged and collected; the call
    /// only fails when no adapter ends up healthy. Adapters whose
    /// `connect()` failed still take part in selection. Calling this on
    /// a connected manager is a no-op.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            debug!("controller manager already connected");
            return Ok(());
        }
        if self.inner.adapters.is_empty() {
            return Err(CoreError::NoActiveController);
        }

        self.inner.state.send_replace(ManagerState::Connecting);

        let results = join_all(self.inner.adapters.iter().map(|adapter| async move {
            (adapter.kind(), adapter.connect().await)
        }))
        .await;

        let mut failures = Vec::new();
        for (kind, result) in results {
            if let Err(e) = result {
                warn!(%kind, error = %e, "adapter failed to connect");
                failures.push(AdapterFailure {
                    kind,
                    reason: e.to_string(),
                });
            }
        }

        if self.inner.select().await.is_none() {
            for adapter in &self.inner.adapters {
                let kind = adapter.kind();
                if !failures.iter().any(|f| f.kind == kind) {
                    failures.push(AdapterFailure {
                        kind,
                        reason: "health check failed".into(),
                    });
                }
            }
            self.inner.disconnect_adapters().await;
            self.inner.state.send_replace(ManagerState::Disconnected);
            return Err(CoreError::Connection { failures });
        }

        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                total = self.inner.adapters.len(),
                "connected with degraded adapter set"
            );
        }

        let cancel = CancellationToken::new();
        *self.inner.cancel.lock().await = cancel.clone();
        let (request_tx, request_rx) = mpsc::channel(REQUEST_CHANNEL_SIZE);
        *self.inner.request_tx.lock().await = Some(request_tx);

        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(failover_task(inner, request_rx, cancel)));

        info!(
            interval = ?self.inner.settings.check_interval,
            "controller manager connected"
        );
        Ok(())
    }

    /// Stop the failover task, disconnect every adapter, and clear the
    /// active pointer. Safe to call when not connected.
    pub async fn disconnect(&self) {
        let mut task = self.inner.task.lock().await;

        self.inner.cancel.lock().await.cancel();
        *self.inner.request_tx.lock().await = None;
        if let Some(handle) = task.take() {
            let _ = handle.await;
        }

        self.inner.disconnect_adapters().await;
        self.inner.active.store(None);
        self.inner.state.send_replace(ManagerState::Disconnected);
        debug!("controller manager disconnected");
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn state(&self) -> ManagerState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ManagerState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_failovers(&self) -> broadcast::Receiver<FailoverEvent> {
        self.inner.failover_tx.subscribe()
    }

    /// The adapter currently active, if any.
    pub fn active(&self) -> Option<Arc<ActiveController>> {
        self.inner.active.load_full()
    }

    /// Tag of the adapter currently active, if any.
    pub fn active_kind(&self) -> Option<ControllerKind> {
        self.inner.active.load_full().map(|a| a.kind)
    }

    /// Fresh health probe of every adapter, in configured order.
    ///
    /// Diagnostic only: the result never changes the active adapter.
    pub async fn status(&self) -> Vec<AdapterStatus> {
        let active_index = self.inner.active.load_full().map(|a| a.index);
        let probes = self
            .inner
            .adapters
            .iter()
            .map(|adapter| self.inner.probe(adapter.as_ref()));
        let results = join_all(probes).await;

        self.inner
            .adapters
            .iter()
            .zip(results)
            .enumerate()
            .map(|(index, (adapter, healthy))| AdapterStatus {
                kind: adapter.kind(),
                healthy,
                active: active_index == Some(index),
            })
            .collect()
    }

    /// Ask the failover task to run full selection now.
    ///
    /// Returns the kind that ended up active.
    pub async fn reselect(&self) -> Result<Option<ControllerKind>, CoreError> {
        let request_tx = self
            .inner
            .request_tx
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)?;

        let (reply, rx) = oneshot::channel();
        request_tx
            .send(ManagerRequest::Reselect { reply })
            .await
            .map_err(|_| CoreError::NotConnected)?;
        rx.await.map_err(|_| CoreError::NotConnected)
    }

    // ── Delegated operations ─────────────────────────────────────

    pub async fn get_devices(&self) -> Result<Vec<NetworkDevice>, CoreError> {
        let active = self.current()?;
        active.adapter.get_devices().await.map_err(vendor(active.kind))
    }

    pub async fn get_flows(&self) -> Result<Vec<NetworkFlow>, CoreError> {
        let active = self.current()?;
        active.adapter.get_flows().await.map_err(vendor(active.kind))
    }

    pub async fn get_stats(&self) -> Result<NetworkStats, CoreError> {
        let active = self.current()?;
        active.adapter.get_stats().await.map_err(vendor(active.kind))
    }

    /// Translate and apply `policy` on the active adapter.
    ///
    /// The policy is not validated here; see [`QosPolicy::validate`].
    pub async fn apply_qos_policy(&self, policy: &QosPolicy) -> Result<(), CoreError> {
        let active = self.current()?;
        info!(kind = %active.kind, policy = %policy.id, "applying QoS policy");
        active
            .adapter
            .apply_qos_policy(policy)
            .await
            .map_err(vendor(active.kind))
    }

    /// Probe the active adapter without triggering failover.
    pub async fn health_check(&self) -> Result<bool, CoreError> {
        let active = self.current()?;
        Ok(self.inner.probe(active.adapter.as_ref()).await)
    }

    /// Snapshot of the active pointer. Absence fails immediately; no
    /// selection is attempted inline.
    fn current(&self) -> Result<Arc<ActiveController>, CoreError> {
        self.inner
            .active
            .load_full()
            .ok_or(CoreError::NoActiveController)
    }
}

fn vendor(kind: ControllerKind) -> impl FnOnce(trident_api::Error) -> CoreError {
    move |source| CoreError::VendorApi { kind, source }
}

// ── Selection ────────────────────────────────────────────────────

impl ManagerInner {
    /// Health probe bounded by `health_check_timeout`.
    async fn probe(&self, adapter: &dyn ControllerAdapter) -> bool {
        let timeout = self.settings.health_check_timeout;
        if let Ok(healthy) = tokio::time::timeout(timeout, adapter.health_check()).await {
            healthy
        } else {
            warn!(kind = %adapter.kind(), ?timeout, "health check timed out");
            false
        }
    }

    /// Probe adapters sequentially in configured order; the first healthy
    /// one becomes active. Clears the pointer when none is healthy.
    async fn select(&self) -> Option<ControllerKind> {
        let mut chosen = None;
        for (index, adapter) in self.adapters.iter().enumerate() {
            if self.probe(adapter.as_ref()).await {
                chosen = Some(Arc::new(ActiveController {
                    index,
                    kind: adapter.kind(),
                    adapter: Arc::clone(adapter),
                }));
                break;
            }
            debug!(kind = %adapter.kind(), "adapter unhealthy, trying next");
        }

        let next = chosen.as_ref().map(|a| (a.index, a.kind));
        let previous = self.active.swap(chosen);
        let previous = previous.as_ref().map(|a| (a.index, a.kind));

        if previous.map(|(i, _)| i) != next.map(|(i, _)| i) {
            let event = FailoverEvent {
                from: previous.map(|(_, k)| k),
                to: next.map(|(_, k)| k),
                at: Utc::now(),
            };
            match (event.from, event.to) {
                (_, Some(to)) => info!(from = ?event.from, %to, "active controller changed"),
                (Some(from), None) => warn!(%from, "no healthy controller available"),
                (None, None) => {}
            }
            let _ = self.failover_tx.send(event);
        }

        let kind = next.map(|(_, k)| k);
        self.state.send_replace(match kind {
            Some(kind) => ManagerState::Active(kind),
            None => ManagerState::NoActiveAvailable,
        });
        kind
    }

    /// Timer path: re-check only the active adapter, falling back to full
    /// selection when it fails or when nothing is active.
    async fn check_active(&self) {
        let Some(current) = self.active.load_full() else {
            debug!("no active controller, running selection");
            self.select().await;
            return;
        };

        if self.probe(current.adapter.as_ref()).await {
            debug!(kind = %current.kind, "active controller healthy");
            return;
        }

        warn!(kind = %current.kind, "active controller failed health check, reselecting");
        self.select().await;
    }

    async fn disconnect_adapters(&self) {
        join_all(self.adapters.iter().map(|a| a.disconnect())).await;
    }
}

/// Periodic re-validation of the active adapter plus on-demand
/// reselection requests, processed one at a time.
async fn failover_task(
    inner: Arc<ManagerInner>,
    mut requests: mpsc::Receiver<ManagerRequest>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(inner.settings.check_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            request = requests.recv() => {
                let Some(request) = request else { break };
                match request {
                    ManagerRequest::Reselect { reply } => {
                        let kind = inner.select().await;
                        let _ = reply.send(kind);
                    }
                }
            }
            _ = interval.tick() => inner.check_active().await,
        }
    }
    debug!("failover task stopped");
}
