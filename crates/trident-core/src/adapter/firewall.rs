// ── Firewall appliance adapter ──
//
// Every request is HMAC-signed by the client; this adapter only maps
// payloads. QoS lands as a single traffic-shaper queue.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use trident_api::firewall::models::{Interface, ShaperQueue, StateEntry};
use trident_api::{FirewallClient, HmacSigner, TlsMode, TransportConfig};

use super::{ControllerAdapter, ControllerKind};
use crate::config::{FirewallApplianceConfig, base_url};
use crate::error::CoreError;
use crate::model::flow::port;
use crate::model::{
    DeviceStatus, NetworkDevice, NetworkFlow, NetworkStats, QosPolicy, UNKNOWN_ADDRESS,
};

const BANDWIDTH_UNIT: &str = "Mb";

pub struct FirewallAdapter {
    client: FirewallClient,
}

impl FirewallAdapter {
    pub fn new(
        config: &FirewallApplianceConfig,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = base_url(&config.host, "https", None)?;
        let tls = if config.verify_ssl {
            transport.tls.clone()
        } else {
            TlsMode::DangerAcceptInvalid
        };
        let transport = transport.clone().with_tls(tls);
        let signer = HmacSigner::new(config.api_key.clone(), config.api_secret.clone());
        let client = FirewallClient::new(url, signer, &transport).map_err(|source| {
            CoreError::VendorApi {
                kind: ControllerKind::FirewallAppliance,
                source,
            }
        })?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: FirewallClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ControllerAdapter for FirewallAdapter {
    fn kind(&self) -> ControllerKind {
        ControllerKind::FirewallAppliance
    }

    async fn connect(&self) -> Result<(), trident_api::Error> {
        self.client.get_system_status().await?;
        info!(url = %self.client.base_url(), "connected to firewall appliance");
        Ok(())
    }

    async fn disconnect(&self) {
        debug!(url = %self.client.base_url(), "firewall adapter released");
    }

    async fn get_devices(&self) -> Result<Vec<NetworkDevice>, trident_api::Error> {
        let interfaces = self.client.list_interfaces().await?;
        let now = Utc::now();
        Ok(interfaces.iter().map(|i| interface_to_device(i, now)).collect())
    }

    async fn get_flows(&self) -> Result<Vec<NetworkFlow>, trident_api::Error> {
        let states = self.client.list_states().await?;
        let now = Utc::now();
        Ok(states.iter().map(|s| state_to_flow(s, now)).collect())
    }

    async fn get_stats(&self) -> Result<NetworkStats, trident_api::Error> {
        let counters = self.client.list_interface_stats().await?;
        let states = self.client.list_states().await?;

        let mut stats = NetworkStats::empty();
        for c in &counters {
            stats.add_counters(c.inbytes, c.outbytes, c.inpkts, c.outpkts);
        }
        stats.add_connections(u64::try_from(states.len()).unwrap_or(u64::MAX));
        Ok(stats)
    }

    async fn apply_qos_policy(&self, policy: &QosPolicy) -> Result<(), trident_api::Error> {
        let queue = policy_to_queue(policy);
        info!(
            interface = %queue.interface,
            queue = %queue.name,
            bandwidth = queue.bandwidth,
            "creating shaper queue"
        );
        self.client.create_shaper_queue(&queue).await
    }

    async fn health_check(&self) -> bool {
        match self.client.get_system_status().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "firewall health check failed");
                false
            }
        }
    }
}

// ── Normalization ────────────────────────────────────────────────

/// Firewall status table: `enable` true → online, false → offline.
/// An interface that doesn't report the flag at all is in error.
fn map_interface_status(enable: Option<bool>) -> DeviceStatus {
    match enable {
        Some(true) => DeviceStatus::Online,
        Some(false) => DeviceStatus::Offline,
        None => DeviceStatus::Error,
    }
}

/// `ipaddr` also carries keywords like `dhcp` or `track6`; only a real
/// address is reported.
fn interface_address(ipaddr: Option<&str>) -> String {
    ipaddr
        .map(str::trim)
        .filter(|raw| raw.parse::<IpAddr>().is_ok())
        .map_or_else(|| UNKNOWN_ADDRESS.into(), str::to_owned)
}

fn interface_to_device(iface: &Interface, now: DateTime<Utc>) -> NetworkDevice {
    NetworkDevice {
        id: iface.id.clone(),
        name: iface
            .descr
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| iface.id.clone()),
        device_type: "interface".into(),
        ip_address: interface_address(iface.ipaddr.as_deref()),
        status: map_interface_status(iface.enable),
        last_seen: now,
    }
}

fn state_to_flow(state: &StateEntry, now: DateTime<Utc>) -> NetworkFlow {
    let source_ip = state.src_ip.clone().unwrap_or_else(|| UNKNOWN_ADDRESS.into());
    let destination_ip = state.dst_ip.clone().unwrap_or_else(|| UNKNOWN_ADDRESS.into());
    let source_port = port(state.src_port);
    let destination_port = port(state.dst_port);
    let protocol = state
        .protocol
        .as_deref()
        .map_or_else(|| "any".into(), str::to_ascii_lowercase);

    let start_time = i64::try_from(state.created)
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(now);

    NetworkFlow {
        id: state.id.clone().unwrap_or_else(|| {
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
        bytes_transferred: state.bytes_in.saturating_add(state.bytes_out),
        packets_transferred: state.packets_in.saturating_add(state.packets_out),
        start_time,
        end_time: None,
    }
}

// ── Policy translation ───────────────────────────────────────────

fn policy_to_queue(policy: &QosPolicy) -> ShaperQueue {
    ShaperQueue {
        name: policy.name.clone(),
        interface: policy.target_device.clone(),
        bandwidth: policy.bandwidth.max,
        bandwidthtype: BANDWIDTH_UNIT.into(),
        linkshare_m2: format!("{}{BANDWIDTH_UNIT}", policy.bandwidth.min),
        priority: policy.priority,
        protocol: policy.protocol.clone(),
        ports: policy.ports().to_vec(),
        description: format!("trident:{}", policy.id),
    }
}
