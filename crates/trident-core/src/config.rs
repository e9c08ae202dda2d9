// ── Runtime manager configuration ──
//
// Describes which backends exist and how to reach them. Carries
// credentials but never touches disk; `trident-config` builds one of
// these from TOML + environment and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::adapter::ControllerKind;
use crate::error::CoreError;

pub const DEFAULT_FAILOVER_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// RESTCONF SDN controller.
#[derive(Debug, Clone)]
pub struct SdnControllerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

/// HMAC-authenticated firewall appliance.
#[derive(Debug, Clone)]
pub struct FirewallApplianceConfig {
    pub host: String,
    pub api_key: String,
    pub api_secret: SecretString,
    /// Verify the appliance's TLS certificate (default on).
    pub verify_ssl: bool,
}

/// RouterOS REST endpoint.
#[derive(Debug, Clone)]
pub struct RouterOsConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Verify the `www-ssl` certificate. RouterOS ships a self-signed one.
    pub verify_ssl: bool,
}

/// Configuration for a `ControllerManager`.
///
/// Any subset of backends may be present. Adapters are built in
/// `failover_order`, which is also the selection priority.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub sdn_controller: Option<SdnControllerConfig>,
    pub firewall_appliance: Option<FirewallApplianceConfig>,
    pub router_os: Option<RouterOsConfig>,
    /// Period of the background health probe.
    pub failover_check_interval: Duration,
    /// Upper bound on a single health probe; expiry counts as unhealthy.
    pub health_check_timeout: Duration,
    /// Per-request timeout enforced by the HTTP transport.
    pub request_timeout: Duration,
    pub failover_order: Vec<ControllerKind>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            sdn_controller: None,
            firewall_appliance: None,
            router_os: None,
            failover_check_interval: DEFAULT_FAILOVER_CHECK_INTERVAL,
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            failover_order: ControllerKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl ManagerConfig {
    /// Backends that are actually configured, in selection order.
    ///
    /// Kinds listed twice keep their first position; configured kinds
    /// missing from `failover_order` are appended in default order.
    pub fn configured_kinds(&self) -> Vec<ControllerKind> {
        let mut kinds: Vec<ControllerKind> = Vec::new();
        let order = self
            .failover_order
            .iter()
            .chain(ControllerKind::DEFAULT_ORDER.iter());
        for kind in order {
            if self.is_configured(*kind) && !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }

    pub fn is_configured(&self, kind: ControllerKind) -> bool {
        match kind {
            ControllerKind::SdnController => self.sdn_controller.is_some(),
            ControllerKind::FirewallAppliance => self.firewall_appliance.is_some(),
            ControllerKind::RouterOs => self.router_os.is_some(),
        }
    }
}

/// Build a backend base URL from a configured `host`.
///
/// `host` may be a bare hostname/IP (`10.0.0.5`) or already carry a
/// scheme (`http://lab-odl:8181`). A bare host gets `default_scheme`; a
/// port is applied unless the URL already names one.
pub fn base_url(host: &str, default_scheme: &str, port: Option<u16>) -> Result<Url, CoreError> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(CoreError::Config {
            message: "backend host must not be empty".into(),
        });
    }

    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("{default_scheme}://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|e| CoreError::Config {
        message: format!("invalid backend host '{host}': {e}"),
    })?;

    if url.port().is_none() {
        if let Some(port) = port {
            url.set_port(Some(port)).map_err(|()| CoreError::Config {
                message: format!("cannot set port {port} on '{host}'"),
            })?;
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn router() -> RouterOsConfig {
        RouterOsConfig {
            host: "10.0.0.1".into(),
            port: 443,
            username: "api".into(),
            password: SecretString::from("pw".to_string()),
            verify_ssl: true,
        }
    }

    fn sdn() -> SdnControllerConfig {
        SdnControllerConfig {
            host: "odl".into(),
            port: 8181,
            username: "admin".into(),
            password: SecretString::from("admin".to_string()),
        }
    }

    #[test]
    fn bare_host_gets_scheme_and_port() {
        let url = base_url("10.0.0.5", "http", Some(8181)).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5:8181/");
    }

    #[test]
    fn explicit_url_port_wins() {
        let url = base_url("http://127.0.0.1:40123", "https", Some(443)).unwrap();
        assert_eq!(url.port(), Some(40123));
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            base_url("  ", "https", None),
            Err(CoreError::Config { .. })
        ));
    }

    #[test]
    fn configured_kinds_follow_failover_order() {
        let config = ManagerConfig {
            sdn_controller: Some(sdn()),
            router_os: Some(router()),
            failover_order: vec![ControllerKind::RouterOs, ControllerKind::SdnController],
            ..ManagerConfig::default()
        };
        assert_eq!(
            config.configured_kinds(),
            vec![ControllerKind::RouterOs, ControllerKind::SdnController]
        );
    }

    #[test]
    fn unlisted_kinds_are_appended() {
        let config = ManagerConfig {
            sdn_controller: Some(sdn()),
            router_os: Some(router()),
            failover_order: vec![ControllerKind::RouterOs, ControllerKind::RouterOs],
            ..ManagerConfig::default()
        };
        assert_eq!(
            config.configured_kinds(),
            vec![ControllerKind::RouterOs, ControllerKind::SdnController]
        );
    }

    #[test]
    fn empty_config_has_no_kinds() {
        assert!(ManagerConfig::default().configured_kinds().is_empty());
    }
}
