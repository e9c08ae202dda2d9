//! Failover core between `trident-api` and its consumers (CLI / REST layer).
//!
//! This crate unifies three incompatible vendor control planes behind one
//! interface and guarantees callers always talk to exactly one live backend:
//!
//! - **[`ControllerAdapter`]**: the seven-operation capability contract.
//!   [`SdnControllerAdapter`], [`FirewallAdapter`], and [`RouterOsAdapter`]
//!   each wrap one vendor client, apply that vendor's own status-mapping
//!   table, and translate a [`QosPolicy`] into vendor-native constructs.
//!
//! - **[`ControllerManager`]** owns the fixed adapter set, connects them
//!   concurrently, selects the first healthy adapter in configured order,
//!   and delegates every query to whichever adapter is active. A single
//!   background task re-validates the active adapter on a timer and fails
//!   over when it stops answering.
//!
//! - **Domain model** ([`model`]): [`NetworkDevice`], [`NetworkFlow`],
//!   [`NetworkStats`] (outputs) and [`QosPolicy`] (input), serialized with
//!   camelCase field names for the REST layer.

pub mod adapter;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{
    ControllerAdapter, ControllerKind, FirewallAdapter, RouterOsAdapter, SdnControllerAdapter,
};
pub use config::{FirewallApplianceConfig, ManagerConfig, RouterOsConfig, SdnControllerConfig};
pub use error::{AdapterFailure, CoreError};
pub use manager::{
    ActiveController, AdapterStatus, ControllerManager, FailoverEvent, FailoverSettings,
    ManagerState,
};
pub use model::{BandwidthLimit, DeviceStatus, NetworkDevice, NetworkFlow, NetworkStats, QosPolicy};
