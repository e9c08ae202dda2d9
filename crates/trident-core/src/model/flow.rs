// ── Flow domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of one active connection or flow entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFlow {
    pub id: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: String,
    pub bytes_transferred: u64,
    pub packets_transferred: u64,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl NetworkFlow {
    /// Id for vendors that don't assign one: `"{src}:{sport}-{dst}:{dport}-{proto}"`.
    pub fn synthesize_id(
        source_ip: &str,
        source_port: u16,
        destination_ip: &str,
        destination_port: u16,
        protocol: &str,
    ) -> String {
        format!("{source_ip}:{source_port}-{destination_ip}:{destination_port}-{protocol}")
    }
}

/// Clamp a vendor port number into `u16`; out-of-range values become 0.
pub(crate) fn port(raw: u64) -> u16 {
    u16::try_from(raw).unwrap_or(0)
}

/// Name an IP protocol number the way operators write it.
pub(crate) fn protocol_name(number: u64) -> String {
    match number {
        0 => "any".into(),
        1 => "icmp".into(),
        6 => "tcp".into(),
        17 => "udp".into(),
        47 => "gre".into(),
        50 => "esp".into(),
        58 => "icmpv6".into(),
        132 => "sctp".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_id_covers_the_tuple() {
        assert_eq!(
            NetworkFlow::synthesize_id("10.0.0.1", 40000, "10.0.0.2", 443, "tcp"),
            "10.0.0.1:40000-10.0.0.2:443-tcp"
        );
    }

    #[test]
    fn out_of_range_ports_clamp_to_zero() {
        assert_eq!(port(443), 443);
        assert_eq!(port(70_000), 0);
    }

    #[test]
    fn protocol_numbers_have_names() {
        assert_eq!(protocol_name(6), "tcp");
        assert_eq!(protocol_name(17), "udp");
        assert_eq!(protocol_name(0), "any");
        assert_eq!(protocol_name(89), "89");
    }
}
