// ── SDN controller adapter ──
//
// Devices come from the operational topology; flows and stats need one
// round trip per switch, issued sequentially. Hosts learned by the host
// tracker show up as topology nodes but carry no flow tables, so they
// are skipped for flow and stats fetches.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use trident_api::sdn::models::{Flow, FlowConfig, FlowConfigDocument, TopologyNode};
use trident_api::{BasicAuth, SdnClient, TransportConfig};

use super::{ControllerAdapter, ControllerKind};
use crate::config::{SdnControllerConfig, base_url};
use crate::error::CoreError;
use crate::model::flow::{port, protocol_name};
use crate::model::{
    DeviceStatus, NetworkDevice, NetworkFlow, NetworkStats, QosPolicy, UNKNOWN_ADDRESS,
};

const HOST_NODE_PREFIX: &str = "host:";
const SWITCH_NODE_PREFIX: &str = "openflow:";
const QOS_TABLE: u8 = 0;
const ETHERTYPE_IPV4: u16 = 0x0800;

pub struct SdnControllerAdapter {
    client: SdnClient,
}

impl SdnControllerAdapter {
    pub fn new(
        config: &SdnControllerConfig,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = base_url(&config.host, "http", Some(config.port))?;
        let auth = BasicAuth::new(config.username.clone(), config.password.clone());
        let client = SdnClient::new(url, auth, transport).map_err(|source| CoreError::VendorApi {
            kind: ControllerKind::SdnController,
            source,
        })?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: SdnClient) -> Self {
        Self { client }
    }

    /// Topology nodes that own flow tables.
    async fn switches(&self) -> Result<Vec<TopologyNode>, trident_api::Error> {
        let nodes = self.client.get_topology().await?;
        Ok(nodes.into_iter().filter(|n| !is_host(n)).collect())
    }
}

#[async_trait]
impl ControllerAdapter for SdnControllerAdapter {
    fn kind(&self) -> ControllerKind {
        ControllerKind::SdnController
    }

    async fn connect(&self) -> Result<(), trident_api::Error> {
        self.client.ping().await?;
        info!(url = %self.client.base_url(), "connected to SDN controller");
        Ok(())
    }

    async fn disconnect(&self) {
        // Stateless basic auth: nothing to tear down on the controller.
        debug!(url = %self.client.base_url(), "SDN controller adapter released");
    }

    async fn get_devices(&self) -> Result<Vec<NetworkDevice>, trident_api::Error> {
        let nodes = self.client.get_topology().await?;
        let now = Utc::now();
        Ok(nodes.iter().map(|n| node_to_device(n, now)).collect())
    }

    async fn get_flows(&self) -> Result<Vec<NetworkFlow>, trident_api::Error> {
        let switches = self.switches().await?;
        let now = Utc::now();
        let mut flows = Vec::new();
        // TODO: fan out with bounded concurrency once controllers with
        // hundreds of switches need it; one round trip per switch today.
        for node in &switches {
            let table = self.client.get_flow_table(&node.node_id).await?;
            debug!(node = %node.node_id, count = table.len(), "fetched flow table");
            flows.extend(table.iter().map(|f| flow_to_network(f, now)));
        }
        Ok(flows)
    }

    async fn get_stats(&self) -> Result<NetworkStats, trident_api::Error> {
        let switches = self.switches().await?;
        let mut stats = NetworkStats::empty();
        for node in &switches {
            let Some(inventory) = self.client.get_node_statistics(&node.node_id).await? else {
                continue;
            };
            for connector in &inventory.connectors {
                let s = &connector.statistics;
                stats.add_counters(
                    s.bytes.received,
                    s.bytes.transmitted,
                    s.packets.received,
                    s.packets.transmitted,
                );
            }
            for table in &inventory.tables {
                if let Some(ref table_stats) = table.statistics {
                    stats.add_connections(table_stats.active_flows);
                }
            }
        }
        Ok(stats)
    }

    async fn apply_qos_policy(&self, policy: &QosPolicy) -> Result<(), trident_api::Error> {
        let doc = policy_to_flow(policy);
        let flow_id = qos_flow_id(policy);
        info!(
            node = %policy.target_device,
            flow = %flow_id,
            queue = policy.priority,
            "installing QoS flow entry"
        );
        self.client
            .put_flow(&policy.target_device, QOS_TABLE, &flow_id, &doc)
            .await
    }

    async fn health_check(&self) -> bool {
        match self.client.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "SDN controller health check failed");
                false
            }
        }
    }
}

// ── Normalization ────────────────────────────────────────────────

fn is_host(node: &TopologyNode) -> bool {
    node.node_id.starts_with(HOST_NODE_PREFIX)
}

fn node_type(node: &TopologyNode) -> &'static str {
    if is_host(node) {
        "host"
    } else if node.node_id.starts_with(SWITCH_NODE_PREFIX) {
        "switch"
    } else {
        "node"
    }
}

/// SDN status table: `"UP"` → online, `"DOWN"` → offline, anything else
/// → error. A node without a status is online: the operational topology
/// only lists nodes the controller currently reaches.
fn map_node_status(status: Option<&str>) -> DeviceStatus {
    match status.map(str::trim) {
        None => DeviceStatus::Online,
        Some(s) if s.eq_ignore_ascii_case("UP") => DeviceStatus::Online,
        Some(s) if s.eq_ignore_ascii_case("DOWN") => DeviceStatus::Offline,
        Some(_) => DeviceStatus::Error,
    }
}

fn node_to_device(node: &TopologyNode, now: DateTime<Utc>) -> NetworkDevice {
    let address = node.addresses.iter().find(|a| a.ip.is_some());
    let ip_address = address
        .and_then(|a| a.ip.clone())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.into());
    // Host tracker reports last-seen in epoch milliseconds.
    let last_seen = address
        .and_then(|a| i64::try_from(a.last_seen).ok())
        .filter(|ms| *ms > 0)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now);

    NetworkDevice {
        id: node.node_id.clone(),
        name: node
            .node_name
            .clone()
            .unwrap_or_else(|| node.node_id.clone()),
        device_type: node_type(node).into(),
        ip_address,
        status: map_node_status(node.status.as_deref()),
        last_seen,
    }
}

fn strip_prefix_len(cidr: Option<&String>) -> String {
    cidr.map_or_else(
        || UNKNOWN_ADDRESS.into(),
        |c| c.split('/').next().unwrap_or(c).to_owned(),
    )
}

fn flow_to_network(flow: &Flow, now: DateTime<Utc>) -> NetworkFlow {
    let m = &flow.flow_match;
    let protocol = protocol_name(m.ip_match.as_ref().map_or(0, |ip| ip.ip_protocol));
    let tcp = m.tcp_source_port != 0 || m.tcp_destination_port != 0;
    let (source_port, destination_port) = if tcp {
        (port(m.tcp_source_port), port(m.tcp_destination_port))
    } else {
        (port(m.udp_source_port), port(m.udp_destination_port))
    };
    let source_ip = strip_prefix_len(m.ipv4_source.as_ref());
    let destination_ip = strip_prefix_len(m.ipv4_destination.as_ref());

    let age = flow
        .statistics
        .duration
        .as_ref()
        .and_then(|d| i64::try_from(d.second).ok())
        .and_then(Duration::try_seconds)
        .unwrap_or_else(Duration::zero);

    NetworkFlow {
        id: flow.id.clone().unwrap_or_else(|| {
            NetworkFlow::synthesize_id(
                &source_ip,
                source_port,
                &destination_ip,
                destination_port,
                &protocol,
            )
        }),
        source_ip,
        destination_ip,
        source_port,
        destination_port,
        protocol,
        bytes_transferred: flow.statistics.byte_count,
        packets_transferred: flow.statistics.packet_count,
        // Ages past chrono's range start at `now`.
        start_time: now.checked_sub_signed(age).unwrap_or(now),
        end_time: None,
    }
}

// ── Policy translation ───────────────────────────────────────────

fn qos_flow_id(policy: &QosPolicy) -> String {
    format!("qos-{}", policy.id)
}

fn ip_protocol_number(protocol: &str) -> Option<u8> {
    match protocol.trim().to_ascii_lowercase().as_str() {
        "tcp" => Some(6),
        "udp" => Some(17),
        "icmp" => Some(1),
        "sctp" => Some(132),
        other => other.parse().ok(),
    }
}

/// One flow entry steering matching traffic into queue `priority`.
///
/// Ports are matched only when exactly one is listed: a single OpenFlow
/// entry cannot express a port set.
fn policy_to_flow(policy: &QosPolicy) -> FlowConfigDocument {
    let mut flow_match = json!({
        "ethernet-match": { "ethernet-type": { "type": ETHERTYPE_IPV4 } }
    });

    let protocol = policy.protocol.as_deref().and_then(ip_protocol_number);
    if let Some(number) = protocol {
        flow_match["ip-match"] = json!({ "ip-protocol": number });
        if let [only] = policy.ports() {
            match number {
                6 => flow_match["tcp-destination-port"] = json!(only),
                17 => flow_match["udp-destination-port"] = json!(only),
                _ => {}
            }
        }
    }

    let instructions = json!({
        "instruction": [{
            "order": 0,
            "apply-actions": {
                "action": [
                    { "order": 0, "set-queue-action": { "queue-id": policy.priority } },
                    { "order": 1, "output-action": { "output-node-connector": "NORMAL" } }
                ]
            }
        }]
    });

    FlowConfigDocument {
        flow: vec![FlowConfig {
            id: qos_flow_id(policy),
            table_id: QOS_TABLE,
            flow_name: policy.name.clone(),
            priority: 100 * u32::from(policy.priority),
            flow_match,
            instructions,
        }],
    }
}
