// ── RouterOS adapter ──
//
// Talks to the RouterOS v7 REST API. QoS is a simple queue plus one
// mangle rule per port that marks the packets the queue picks up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use trident_api::router::models::{
    Address, Connection, Interface, MangleRule, SimpleQueue, split_endpoint,
};
use trident_api::{BasicAuth, RouterClient, TlsMode, TransportConfig};

use super::{ControllerAdapter, ControllerKind};
use crate::config::{RouterOsConfig, base_url};
use crate::error::CoreError;
use crate::model::{
    DeviceStatus, NetworkDevice, NetworkFlow, NetworkStats, QosPolicy, UNKNOWN_ADDRESS,
};

const DEFAULT_MANGLE_PROTOCOL: &str = "tcp";

pub struct RouterOsAdapter {
    client: RouterClient,
}

impl RouterOsAdapter {
    pub fn new(config: &RouterOsConfig, transport: &TransportConfig) -> Result<Self, CoreError> {
        let url = base_url(&config.host, "https", Some(config.port))?;
        let tls = if config.verify_ssl {
            transport.tls.clone()
        } else {
            TlsMode::DangerAcceptInvalid
        };
        let transport = transport.clone().with_tls(tls);
        let auth = BasicAuth::new(config.username.clone(), config.password.clone());
        let client =
            RouterClient::new(url, auth, &transport).map_err(|source| CoreError::VendorApi {
                kind: ControllerKind::RouterOs,
                source,
            })?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: RouterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ControllerAdapter for RouterOsAdapter {
    fn kind(&self) -> ControllerKind {
        ControllerKind::RouterOs
    }

    async fn connect(&self) -> Result<(), trident_api::Error> {
        self.client.system_resource().await?;
        info!(url = %self.client.base_url(), "connected to RouterOS");
        Ok(())
    }

    async fn disconnect(&self) {
        debug!(url = %self.client.base_url(), "RouterOS adapter released");
    }

    async fn get_devices(&self) -> Result<Vec<NetworkDevice>, trident_api::Error> {
        let interfaces = self.client.list_interfaces().await?;
        let now = Utc::now();
        let mut devices = Vec::with_capacity(interfaces.len());
        for iface in &interfaces {
            let addresses = self.client.interface_addresses(&iface.name).await?;
            devices.push(interface_to_device(iface, &addresses, now));
        }
        Ok(devices)
    }

    async fn get_flows(&self) -> Result<Vec<NetworkFlow>, trident_api::Error> {
        let connections = self.client.list_connections().await?;
        let now = Utc::now();
        Ok(connections
            .iter()
            .map(|c| connection_to_flow(c, now))
            .collect())
    }

    async fn get_stats(&self) -> Result<NetworkStats, trident_api::Error> {
        let interfaces = self.client.list_interfaces().await?;
        let connections = self.client.list_connections().await?;

        let mut stats = NetworkStats::empty();
        for iface in &interfaces {
            stats.add_counters(iface.rx_byte, iface.tx_byte, iface.rx_packet, iface.tx_packet);
        }
        stats.add_connections(u64::try_from(connections.len()).unwrap_or(u64::MAX));
        Ok(stats)
    }

    /// Creates the queue, then the mangle rules. Nothing is rolled back
    /// if a later rule fails, and re-applying the same policy creates a
    /// second queue.
    async fn apply_qos_policy(&self, policy: &QosPolicy) -> Result<(), trident_api::Error> {
        let queue = policy_to_queue(policy);
        info!(target = %queue.target, queue = %queue.name, "adding simple queue");
        self.client.add_simple_queue(&queue).await?;

        for rule in policy_to_mangle_rules(policy) {
            debug!(port = %rule.dst_port, mark = %rule.new_packet_mark, "adding mangle rule");
            self.client.add_mangle_rule(&rule).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self.client.system_resource().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "RouterOS health check failed");
                false
            }
        }
    }
}

// ── Normalization ────────────────────────────────────────────────

/// RouterOS status table: administratively disabled → offline, link
/// running → online, enabled but not running → error.
fn map_interface_status(iface: &Interface) -> DeviceStatus {
    if iface.disabled == Some(true) {
        DeviceStatus::Offline
    } else if iface.running == Some(true) {
        DeviceStatus::Online
    } else {
        DeviceStatus::Error
    }
}

fn interface_to_device(
    iface: &Interface,
    addresses: &[Address],
    now: DateTime<Utc>,
) -> NetworkDevice {
    let ip_address = addresses
        .iter()
        .find(|a| a.disabled != Some(true))
        .map_or_else(|| UNKNOWN_ADDRESS.into(), |a| a.ip().to_owned());

    NetworkDevice {
        id: iface.id.clone().unwrap_or_else(|| iface.name.clone()),
        name: iface.name.clone(),
        device_type: iface
            .interface_type
            .clone()
            .unwrap_or_else(|| "interface".into()),
        ip_address,
        status: map_interface_status(iface),
        last_seen: now,
    }
}

fn connection_to_flow(conn: &Connection, now: DateTime<Utc>) -> NetworkFlow {
    let (source_ip, source_port) = conn
        .src_address
        .as_deref()
        .map_or_else(|| (UNKNOWN_ADDRESS.into(), 0), split_endpoint);
    let (destination_ip, destination_port) = conn
        .dst_address
        .as_deref()
        .map_or_else(|| (UNKNOWN_ADDRESS.into(), 0), split_endpoint);
    let protocol = conn
        .protocol
        .as_deref()
        .map_or_else(|| "any".into(), str::to_ascii_lowercase);

    NetworkFlow {
        id: conn.id.clone().unwrap_or_else(|| {
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
        bytes_transferred: conn.orig_bytes.saturating_add(conn.repl_bytes),
        packets_transferred: conn.orig_packets.saturating_add(conn.repl_packets),
        start_time: now,
        end_time: None,
    }
}

// ── Policy translation ───────────────────────────────────────────

fn packet_mark(policy: &QosPolicy) -> String {
    format!("qos-{}", policy.id)
}

fn comment(policy: &QosPolicy) -> String {
    format!("trident:{}", policy.id)
}

fn policy_to_queue(policy: &QosPolicy) -> SimpleQueue {
    let min = policy.bandwidth.min;
    let max = policy.bandwidth.max;
    let p = policy.priority;
    SimpleQueue {
        name: policy.name.clone(),
        target: policy.target_device.clone(),
        max_limit: format!("{max}M/{max}M"),
        limit_at: format!("{min}M/{min}M"),
        priority: format!("{p}/{p}"),
        packet_marks: (!policy.ports().is_empty()).then(|| packet_mark(policy)),
        comment: comment(policy),
    }
}

fn policy_to_mangle_rules(policy: &QosPolicy) -> Vec<MangleRule> {
    let protocol = policy
        .protocol
        .as_deref()
        .unwrap_or(DEFAULT_MANGLE_PROTOCOL)
        .to_ascii_lowercase();
    policy
        .ports()
        .iter()
        .map(|port| MangleRule {
            chain: "forward".into(),
            action: "mark-packet".into(),
            new_packet_mark: packet_mark(policy),
            protocol: protocol.clone(),
            dst_port: port.to_string(),
            passthrough: "yes".into(),
            comment: comment(policy),
        })
        .collect()
}
