// ── Controller adapter contract ──
//
// One flat trait, implemented independently per vendor. Adapters never
// share mapping logic; each module owns its own status table and policy
// translation.

mod firewall;
mod router;
mod sdn;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{NetworkDevice, NetworkFlow, NetworkStats, QosPolicy};

pub use firewall::FirewallAdapter;
pub use router::RouterOsAdapter;
pub use sdn::SdnControllerAdapter;

/// Vendor identity of an adapter, fixed at construction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ControllerKind {
    SdnController,
    FirewallAppliance,
    RouterOs,
}

impl ControllerKind {
    /// Declaration order used when no explicit failover order is given.
    pub const DEFAULT_ORDER: [Self; 3] = [
        Self::SdnController,
        Self::FirewallAppliance,
        Self::RouterOs,
    ];
}

/// The capability contract every vendor backend implements.
///
/// `health_check` must swallow every error and report `false`; all other
/// operations surface vendor failures as [`trident_api::Error`].
#[async_trait]
pub trait ControllerAdapter: Send + Sync {
    /// Fixed vendor tag.
    fn kind(&self) -> ControllerKind;

    /// Establish the session / verify credentials.
    async fn connect(&self) -> Result<(), trident_api::Error>;

    /// Best-effort teardown. Never fails.
    async fn disconnect(&self);

    async fn get_devices(&self) -> Result<Vec<NetworkDevice>, trident_api::Error>;

    async fn get_flows(&self) -> Result<Vec<NetworkFlow>, trident_api::Error>;

    /// Counters summed across interfaces; missing fields count as 0.
    async fn get_stats(&self) -> Result<NetworkStats, trident_api::Error>;

    /// Translate and push `policy`. Not idempotent: re-applying the same
    /// policy creates the vendor constructs again.
    async fn apply_qos_policy(&self, policy: &QosPolicy) -> Result<(), trident_api::Error>;

    /// Lightweight reachability probe.
    async fn health_check(&self) -> bool;
}
