// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder address when a vendor reports none.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Three-state device status shared by every vendor.
///
/// Each adapter keeps its own mapping table into this enum; there is no
/// shared mapping logic beyond the output type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Error,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// One normalized view of a vendor interface or node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    /// `"unknown"` when the vendor provides no address.
    pub ip_address: String,
    pub status: DeviceStatus,
    pub last_seen: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_rest_field_names() {
        let device = NetworkDevice {
            id: "ether1".into(),
            name: "ether1".into(),
            device_type: "ether".into(),
            ip_address: UNKNOWN_ADDRESS.into(),
            status: DeviceStatus::Error,
            last_seen: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value["type"], json!("ether"));
        assert_eq!(value["ipAddress"], json!("unknown"));
        assert_eq!(value["status"], json!("error"));
        assert_eq!(value["lastSeen"], json!("1970-01-01T00:00:00Z"));
    }
}
