// ── RESTCONF wire models ──
//
// Only the fields the normalizer reads are modelled. Every counter goes
// through `lenient::counter` because operational datastores omit
// statistics for ports and flows that have not been polled yet.

use serde::{Deserialize, Serialize};

use crate::lenient;

// ── Topology ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyDocument {
    #[serde(
        rename = "network-topology",
        default,
        deserialize_with = "lenient::nullable"
    )]
    pub network_topology: NetworkTopology,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkTopology {
    #[serde(default)]
    pub topology: Vec<Topology>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(rename = "topology-id", default)]
    pub topology_id: String,
    #[serde(default)]
    pub node: Vec<TopologyNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopologyNode {
    #[serde(rename = "node-id")]
    pub node_id: String,
    #[serde(rename = "node-name", default)]
    pub node_name: Option<String>,
    /// Controller-reported link state (`"UP"` / `"DOWN"`); often absent.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "host-tracker-service:addresses", default)]
    pub addresses: Vec<HostAddress>,
    #[serde(rename = "termination-point", default)]
    pub termination_points: Vec<TerminationPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostAddress {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(rename = "last-seen", default, deserialize_with = "lenient::counter")]
    pub last_seen: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminationPoint {
    #[serde(rename = "tp-id")]
    pub tp_id: String,
}

// ── Flow table ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowTableDocument {
    #[serde(rename = "flow-node-inventory:table", default)]
    pub tables: Vec<FlowTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowTable {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub id: u64,
    #[serde(default)]
    pub flow: Vec<Flow>,
    #[serde(
        rename = "opendaylight-flow-table-statistics:flow-table-statistics",
        default
    )]
    pub statistics: Option<FlowTableStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowTableStatistics {
    #[serde(rename = "active-flows", default, deserialize_with = "lenient::counter")]
    pub active_flows: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "match", default, deserialize_with = "lenient::nullable")]
    pub flow_match: FlowMatch,
    #[serde(
        rename = "opendaylight-flow-statistics:flow-statistics",
        default,
        deserialize_with = "lenient::nullable"
    )]
    pub statistics: FlowStatistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowMatch {
    #[serde(rename = "ipv4-source", default)]
    pub ipv4_source: Option<String>,
    #[serde(rename = "ipv4-destination", default)]
    pub ipv4_destination: Option<String>,
    #[serde(rename = "ip-match", default)]
    pub ip_match: Option<IpMatch>,
    #[serde(rename = "tcp-source-port", default, deserialize_with = "lenient::counter")]
    pub tcp_source_port: u64,
    #[serde(rename = "tcp-destination-port", default, deserialize_with = "lenient::counter")]
    pub tcp_destination_port: u64,
    #[serde(rename = "udp-source-port", default, deserialize_with = "lenient::counter")]
    pub udp_source_port: u64,
    #[serde(rename = "udp-destination-port", default, deserialize_with = "lenient::counter")]
    pub udp_destination_port: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpMatch {
    #[serde(rename = "ip-protocol", default, deserialize_with = "lenient::counter")]
    pub ip_protocol: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowStatistics {
    #[serde(rename = "byte-count", default, deserialize_with = "lenient::counter")]
    pub byte_count: u64,
    #[serde(rename = "packet-count", default, deserialize_with = "lenient::counter")]
    pub packet_count: u64,
    #[serde(default)]
    pub duration: Option<FlowDuration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowDuration {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub second: u64,
}

// ── Inventory node ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeDocument {
    #[serde(default)]
    pub node: Vec<InventoryNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryNode {
    pub id: String,
    #[serde(rename = "node-connector", default)]
    pub connectors: Vec<NodeConnector>,
    #[serde(rename = "flow-node-inventory:table", default)]
    pub tables: Vec<FlowTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConnector {
    pub id: String,
    #[serde(
        rename = "opendaylight-port-statistics:flow-capable-node-connector-statistics",
        default,
        deserialize_with = "lenient::nullable"
    )]
    pub statistics: PortStatistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortStatistics {
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub bytes: Directional,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub packets: Directional,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Directional {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub received: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub transmitted: u64,
}

// ── Flow programming ───────────────────────────────────────────────

/// Body for `PUT .../table/{t}/flow/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct FlowConfigDocument {
    #[serde(rename = "flow-node-inventory:flow")]
    pub flow: Vec<FlowConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowConfig {
    pub id: String,
    #[serde(rename = "table_id")]
    pub table_id: u8,
    #[serde(rename = "flow-name")]
    pub flow_name: String,
    pub priority: u32,
    #[serde(rename = "match")]
    pub flow_match: serde_json::Value,
    pub instructions: serde_json::Value,
}
