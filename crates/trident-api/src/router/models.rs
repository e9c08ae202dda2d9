// ── RouterOS wire models ──
//
// RouterOS renders every property as a string ("true", "1500", "*1A"),
// so counters and flags decode through the `lenient` helpers.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// `GET /rest/interface`
#[derive(Debug, Clone, Deserialize)]
pub struct Interface {
    #[serde(rename = ".id", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub interface_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub running: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub disabled: Option<bool>,
    #[serde(rename = "rx-byte", default, deserialize_with = "lenient::counter")]
    pub rx_byte: u64,
    #[serde(rename = "tx-byte", default, deserialize_with = "lenient::counter")]
    pub tx_byte: u64,
    #[serde(rename = "rx-packet", default, deserialize_with = "lenient::counter")]
    pub rx_packet: u64,
    #[serde(rename = "tx-packet", default, deserialize_with = "lenient::counter")]
    pub tx_packet: u64,
    #[serde(rename = "last-link-up-time", default)]
    pub last_link_up_time: Option<String>,
}

/// `GET /rest/ip/address`
#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    /// CIDR notation, e.g. `"192.168.88.1/24"`.
    pub address: String,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub disabled: Option<bool>,
}

impl Address {
    /// The host part of the CIDR address.
    pub fn ip(&self) -> &str {
        self.address.split('/').next().unwrap_or(&self.address)
    }
}

/// `GET /rest/ip/firewall/connection`
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    #[serde(rename = ".id", default)]
    pub id: Option<String>,
    /// `"ip:port"`, or a bare IP for port-less protocols.
    #[serde(rename = "src-address", default)]
    pub src_address: Option<String>,
    #[serde(rename = "dst-address", default)]
    pub dst_address: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(rename = "orig-bytes", default, deserialize_with = "lenient::counter")]
    pub orig_bytes: u64,
    #[serde(rename = "repl-bytes", default, deserialize_with = "lenient::counter")]
    pub repl_bytes: u64,
    #[serde(rename = "orig-packets", default, deserialize_with = "lenient::counter")]
    pub orig_packets: u64,
    #[serde(rename = "repl-packets", default, deserialize_with = "lenient::counter")]
    pub repl_packets: u64,
}

/// Body for `PUT /rest/queue/simple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimpleQueue {
    pub name: String,
    pub target: String,
    pub max_limit: String,
    pub limit_at: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_marks: Option<String>,
    pub comment: String,
}

/// Body for `PUT /rest/ip/firewall/mangle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MangleRule {
    pub chain: String,
    pub action: String,
    pub new_packet_mark: String,
    pub protocol: String,
    pub dst_port: String,
    pub passthrough: String,
    pub comment: String,
}

/// `{"error": 400, "message": "Bad Request", "detail": "..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct RouterOsError {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub error: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Split a RouterOS `"ip:port"` endpoint. IPv6 endpoints arrive as
/// `"[addr]:port"`; a missing or unparsable port yields 0.
pub fn split_endpoint(raw: &str) -> (String, u16) {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('[') {
        if let Some((ip, tail)) = rest.split_once(']') {
            let port = tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            return (ip.to_owned(), port);
        }
    }
    match raw.rsplit_once(':') {
        // More than one colon without brackets is a bare IPv6 address.
        Some((ip, port)) if !ip.contains(':') => (ip.to_owned(), port.parse().unwrap_or(0)),
        _ => (raw.to_owned(), 0),
    }
}
