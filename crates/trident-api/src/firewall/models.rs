// ── Firewall appliance wire models ──

use serde::{Deserialize, Serialize};

use crate::lenient;

/// `{ "status": "ok", "code": 200, "message": "...", "data": ... }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// One configured interface (`GET /api/v1/interface`).
#[derive(Debug, Clone, Deserialize)]
pub struct Interface {
    pub id: String,
    /// Operator-facing description, e.g. `"WAN"`.
    #[serde(default)]
    pub descr: Option<String>,
    /// Physical port behind the logical interface, e.g. `"igb0"`.
    #[serde(rename = "if", default)]
    pub physical: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enable: Option<bool>,
    #[serde(default)]
    pub ipaddr: Option<String>,
}

/// Live counters for one interface (`GET /api/v1/status/interface`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceStats {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub inbytes: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub outbytes: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub inpkts: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub outpkts: u64,
}

/// One entry of the connection-state table (`GET /api/v1/diagnostics/states`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub dst_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub src_port: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub dst_port: u64,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub bytes_in: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub bytes_out: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub packets_in: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub packets_out: u64,
    /// Unix seconds when the state was created; 0 when unknown.
    #[serde(default, deserialize_with = "lenient::counter")]
    pub created: u64,
}

/// Body for `POST /api/v1/firewall/traffic_shaper/queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaperQueue {
    pub name: String,
    pub interface: String,
    pub bandwidth: u32,
    pub bandwidthtype: String,
    pub linkshare_m2: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ports: Vec<u16>,
    pub description: String,
}
