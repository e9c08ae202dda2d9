// ── Core error types ──
//
// The failover taxonomy: connect-time failure, no live backend, a vendor
// call that failed, and a malformed policy. Vendor transport detail is
// kept as the `source` of `VendorApi` so callers can still inspect it.

use std::fmt;

use thiserror::Error;

use crate::adapter::ControllerKind;

/// One adapter's connect-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    pub kind: ControllerKind,
    pub reason: String,
}

impl fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Availability ─────────────────────────────────────────────────
    /// No adapter ended up healthy after `connect()`.
    #[error("No controller could be connected: {}", join_failures(.failures))]
    Connection { failures: Vec<AdapterFailure> },

    /// No adapter is currently active.
    #[error("No active controller available")]
    NoActiveController,

    /// The manager has not been connected (or was disconnected).
    #[error("Controller manager is not connected")]
    NotConnected,

    // ── Delegated calls ──────────────────────────────────────────────
    /// The active adapter's vendor call failed.
    #[error("{kind} API call failed: {source}")]
    VendorApi {
        kind: ControllerKind,
        #[source]
        source: trident_api::Error,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Maps to "service unavailable" at the REST boundary.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NoActiveController | Self::NotConnected | Self::Connection { .. }
        )
    }

    /// Maps to "upstream failure" at the REST boundary.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::VendorApi { .. })
    }

    /// The vendor that produced this error, if any.
    pub fn kind(&self) -> Option<ControllerKind> {
        match self {
            Self::VendorApi { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

fn join_failures(failures: &[AdapterFailure]) -> String {
    if failures.is_empty() {
        return "no controllers configured".into();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_lists_every_failure() {
        let err = CoreError::Connection {
            failures: vec![
                AdapterFailure {
                    kind: ControllerKind::SdnController,
                    reason: "connection refused".into(),
                },
                AdapterFailure {
                    kind: ControllerKind::RouterOs,
                    reason: "health check failed".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "No controller could be connected: sdn-controller: connection refused; \
             router-os: health check failed"
        );
        assert!(err.is_unavailable());
        assert!(!err.is_upstream());
    }

    #[test]
    fn vendor_errors_are_upstream() {
        let err = CoreError::VendorApi {
            kind: ControllerKind::FirewallAppliance,
            source: trident_api::Error::Api {
                status: 500,
                message: "boom".into(),
            },
        };
        assert!(err.is_upstream());
        assert_eq!(err.kind(), Some(ControllerKind::FirewallAppliance));
        assert!(err.to_string().starts_with("firewall-appliance API call failed"));
    }
}
