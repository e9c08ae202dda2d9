// ── QoS policy input ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Bandwidth bounds in Mbit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthLimit {
    pub min: u32,
    pub max: u32,
}

/// A uniform bandwidth/priority rule. Input only; never returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QosPolicy {
    pub id: String,
    pub name: String,
    pub target_device: String,
    pub bandwidth: BandwidthLimit,
    /// 1 (lowest) to 5 (highest).
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
}

impl QosPolicy {
    pub const MIN_PRIORITY: u8 = 1;
    pub const MAX_PRIORITY: u8 = 5;

    /// Listed ports, or an empty slice.
    pub fn ports(&self) -> &[u16] {
        self.ports.as_deref().unwrap_or_default()
    }

    /// Checks the calling layer performs before submitting a policy.
    /// The manager itself never validates.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fail = |message: String| Err(CoreError::Validation { message });

        if self.id.trim().is_empty() {
            return fail("policy id must not be empty".into());
        }
        if self.name.trim().is_empty() {
            return fail("policy name must not be empty".into());
        }
        if self.target_device.trim().is_empty() {
            return fail("target device must not be empty".into());
        }
        if !(Self::MIN_PRIORITY..=Self::MAX_PRIORITY).contains(&self.priority) {
            return fail(format!(
                "priority {} outside {}..={}",
                self.priority,
                Self::MIN_PRIORITY,
                Self::MAX_PRIORITY
            ));
        }
        if self.bandwidth.max == 0 {
            return fail("maximum bandwidth must be greater than zero".into());
        }
        if self.bandwidth.min > self.bandwidth.max {
            return fail(format!(
                "minimum bandwidth {} exceeds maximum {}",
                self.bandwidth.min, self.bandwidth.max
            ));
        }
        if self.ports().contains(&0) {
            return fail("port 0 is not a valid match".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use serde_json::json;

    use super::*;

    fn policy() -> QosPolicy {
        QosPolicy {
            id: "p1".into(),
            name: "voice".into(),
            target_device: "ether1".into(),
            bandwidth: BandwidthLimit { min: 5, max: 20 },
            priority: 3,
            protocol: Some("udp".into()),
            ports: Some(vec![5060]),
        }
    }

    #[test]
    fn valid_policy_passes() {
        assert!(policy().validate().is_ok());
    }

    #[test]
    fn priority_outside_range_fails() {
        for priority in [0, 6] {
            let p = QosPolicy {
                priority,
                ..policy()
            };
            assert!(matches!(p.validate(), Err(CoreError::Validation { .. })));
        }
    }

    #[test]
    fn inverted_bandwidth_fails() {
        let p = QosPolicy {
            bandwidth: BandwidthLimit { min: 30, max: 20 },
            ..policy()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn deserializes_camel_case_without_optionals() {
        let p: QosPolicy = serde_json::from_value(json!({
            "id": "p2",
            "name": "bulk",
            "targetDevice": "openflow:1",
            "bandwidth": { "min": 1, "max": 10 },
            "priority": 1
        }))
        .unwrap();
        assert_eq!(p.target_device, "openflow:1");
        assert!(p.ports().is_empty());
        assert!(p.protocol.is_none());
    }
}
