// ── Normalized network model ──
//
// The only shapes consumers ever see. Every adapter converts its vendor
// payloads into these; nothing vendor-specific leaks past this module.

pub mod device;
pub mod flow;
pub mod policy;
pub mod stats;

pub use device::{DeviceStatus, NetworkDevice, UNKNOWN_ADDRESS};
pub use flow::NetworkFlow;
pub use policy::{BandwidthLimit, QosPolicy};
pub use stats::NetworkStats;
