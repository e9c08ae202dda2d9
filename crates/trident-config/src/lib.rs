//! Shared configuration for trident.
//!
//! TOML file + `TRIDENT_` environment (figment), credential resolution
//! (env var → keyring → plaintext), and translation to
//! `trident_core::ManagerConfig`. Core never sees these types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use trident_core::{
    ControllerKind, FirewallApplianceConfig, ManagerConfig, RouterOsConfig, SdnControllerConfig,
};

/// Keyring service name; accounts are `"{backend}/{field}"`.
pub const KEYRING_SERVICE: &str = "trident";

const ENV_PREFIX: &str = "TRIDENT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {field} configured for {backend}")]
    MissingSecret { backend: String, field: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Seconds between failover health checks.
    #[serde(default = "default_check_interval")]
    pub failover_check_interval_seconds: u64,

    /// Seconds before a single health probe counts as failed.
    #[serde(default = "default_health_timeout")]
    pub health_check_timeout_seconds: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Selection priority, highest first.
    #[serde(default = "default_failover_order")]
    pub failover_order: Vec<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdn_controller: Option<SdnControllerSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_appliance: Option<FirewallApplianceSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_os: Option<RouterOsSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            failover_check_interval_seconds: default_check_interval(),
            health_check_timeout_seconds: default_health_timeout(),
            request_timeout_seconds: default_request_timeout(),
            failover_order: default_failover_order(),
            defaults: Defaults::default(),
            sdn_controller: None,
            firewall_appliance: None,
            router_os: None,
        }
    }
}

/// Presentation defaults for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SdnControllerSection {
    pub host: String,
    #[serde(default = "default_sdn_port")]
    pub port: u16,
    pub username: String,
    /// Plaintext password. Prefer `password_env` or the keyring.
    pub password: Option<String>,
    /// Environment variable holding the password.
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirewallApplianceSection {
    pub host: String,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    /// Plaintext HMAC secret. Prefer `api_secret_env` or the keyring.
    pub api_secret: Option<String>,
    pub api_secret_env: Option<String>,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouterOsSection {
    pub host: String,
    #[serde(default = "default_router_port")]
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub password_env: Option<String>,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

fn default_check_interval() -> u64 {
    30
}
fn default_health_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_failover_order() -> Vec<String> {
    ControllerKind::DEFAULT_ORDER
        .iter()
        .map(ToString::to_string)
        .collect()
}
fn default_output() -> String {
    "table".into()
}
fn default_sdn_port() -> u16 {
    8181
}
fn default_router_port() -> u16 {
    443
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Starter config written by `trident config init`: every backend
    /// declared, secrets pointed at environment variables.
    pub fn example() -> Self {
        Self {
            sdn_controller: Some(SdnControllerSection {
                host: "odl.example.net".into(),
                port: default_sdn_port(),
                username: "admin".into(),
                password: None,
                password_env: Some("ODL_PASSWORD".into()),
            }),
            firewall_appliance: Some(FirewallApplianceSection {
                host: "fw.example.net".into(),
                api_key: None,
                api_key_env: Some("FIREWALL_API_KEY".into()),
                api_secret: None,
                api_secret_env: Some("FIREWALL_API_SECRET".into()),
                verify_ssl: true,
            }),
            router_os: Some(RouterOsSection {
                host: "router.example.net".into(),
                port: default_router_port(),
                username: "api".into(),
                password: None,
                password_env: Some("ROUTEROS_PASSWORD".into()),
                verify_ssl: false,
            }),
            ..Self::default()
        }
    }

    /// Validate and resolve secrets against the real environment and
    /// system keyring.
    pub fn to_manager_config(&self) -> Result<ManagerConfig, ConfigError> {
        self.to_manager_config_with(&SystemSecrets)
    }

    /// Validate and resolve secrets from `secrets`.
    ///
    /// This is the single boundary where file config types cross into
    /// core types.
    pub fn to_manager_config_with(
        &self,
        secrets: &dyn SecretStore,
    ) -> Result<ManagerConfig, ConfigError> {
        let failover_order = parse_failover_order(&self.failover_order)?;

        let sdn_controller = match self.sdn_controller {
            Some(ref s) => {
                let backend = ControllerKind::SdnController;
                Some(SdnControllerConfig {
                    host: require_host(backend, &s.host)?,
                    port: require_port(backend, s.port)?,
                    username: s.username.clone(),
                    password: resolve_secret(
                        secrets,
                        backend,
                        "password",
                        s.password_env.as_deref(),
                        s.password.as_deref(),
                    )?,
                })
            }
            None => None,
        };

        let firewall_appliance = match self.firewall_appliance {
            Some(ref f) => {
                let backend = ControllerKind::FirewallAppliance;
                let api_key = f
                    .api_key_env
                    .as_deref()
                    .and_then(|name| secrets.env(name))
                    .or_else(|| f.api_key.clone())
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| ConfigError::MissingSecret {
                        backend: backend.to_string(),
                        field: "api_key".into(),
                    })?;
                Some(FirewallApplianceConfig {
                    host: require_host(backend, &f.host)?,
                    api_key,
                    api_secret: resolve_secret(
                        secrets,
                        backend,
                        "api_secret",
                        f.api_secret_env.as_deref(),
                        f.api_secret.as_deref(),
                    )?,
                    verify_ssl: f.verify_ssl,
                })
            }
            None => None,
        };

        let router_os = match self.router_os {
            Some(ref r) => {
                let backend = ControllerKind::RouterOs;
                Some(RouterOsConfig {
                    host: require_host(backend, &r.host)?,
                    port: require_port(backend, r.port)?,
                    username: r.username.clone(),
                    password: resolve_secret(
                        secrets,
                        backend,
                        "password",
                        r.password_env.as_deref(),
                        r.password.as_deref(),
                    )?,
                    verify_ssl: r.verify_ssl,
                })
            }
            None => None,
        };

        Ok(ManagerConfig {
            sdn_controller,
            firewall_appliance,
            router_os,
            failover_check_interval: positive_seconds(
                "failover_check_interval_seconds",
                self.failover_check_interval_seconds,
            )?,
            health_check_timeout: positive_seconds(
                "health_check_timeout_seconds",
                self.health_check_timeout_seconds,
            )?,
            request_timeout: positive_seconds(
                "request_timeout_seconds",
                self.request_timeout_seconds,
            )?,
            failover_order,
        })
    }
}

// ── Validation helpers ──────────────────────────────────────────────

fn require_host(backend: ControllerKind, host: &str) -> Result<String, ConfigError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: format!("{backend}.host"),
            reason: "must not be empty".into(),
        });
    }
    Ok(host.to_owned())
}

fn require_port(backend: ControllerKind, port: u16) -> Result<u16, ConfigError> {
    if port == 0 {
        return Err(ConfigError::Validation {
            field: format!("{backend}.port"),
            reason: "must be between 1 and 65535".into(),
        });
    }
    Ok(port)
}

fn positive_seconds(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_failover_order(raw: &[String]) -> Result<Vec<ControllerKind>, ConfigError> {
    let mut order = Vec::with_capacity(raw.len());
    for label in raw {
        let kind = ControllerKind::from_str(label.trim()).map_err(|_| ConfigError::Validation {
            field: "failover_order".into(),
            reason: format!("unknown controller '{label}'"),
        })?;
        if order.contains(&kind) {
            return Err(ConfigError::Validation {
                field: "failover_order".into(),
                reason: format!("'{kind}' is listed more than once"),
            });
        }
        order.push(kind);
    }
    Ok(order)
}

// ── Credential resolution ───────────────────────────────────────────

/// Where secrets come from besides the config file itself.
pub trait SecretStore {
    fn env(&self, name: &str) -> Option<String>;
    fn keyring(&self, account: &str) -> Option<String>;
}

/// Process environment + system keyring.
pub struct SystemSecrets;

impl SecretStore for SystemSecrets {
    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn keyring(&self, account: &str) -> Option<String> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account).ok()?;
        match entry.get_password() {
            Ok(secret) => Some(secret),
            Err(e) => {
                debug!(account, error = %e, "no keyring entry");
                None
            }
        }
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticSecrets {
    pub env: HashMap<String, String>,
    pub keyring: HashMap<String, String>,
}

impl SecretStore for StaticSecrets {
    fn env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn keyring(&self, account: &str) -> Option<String> {
        self.keyring.get(account).cloned()
    }
}

/// Keyring account for one backend secret, e.g. `"router-os/password"`.
pub fn keyring_account(backend: ControllerKind, field: &str) -> String {
    format!("{backend}/{field}")
}

/// Resolve a secret: `*_env` variable → keyring → plaintext.
fn resolve_secret(
    secrets: &dyn SecretStore,
    backend: ControllerKind,
    field: &str,
    env_name: Option<&str>,
    plaintext: Option<&str>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var named by the config
    if let Some(value) = env_name.and_then(|name| secrets.env(name)) {
        return Ok(SecretString::from(value));
    }

    // 2. System keyring
    if let Some(value) = secrets.keyring(&keyring_account(backend, field)) {
        return Ok(SecretString::from(value));
    }

    // 3. Plaintext in config
    if let Some(value) = plaintext {
        return Ok(SecretString::from(value.to_owned()));
    }

    Err(ConfigError::MissingSecret {
        backend: backend.to_string(),
        field: field.into(),
    })
}

/// Store a backend secret in the system keyring.
pub fn store_secret(backend: ControllerKind, field: &str, value: &str) -> Result<(), ConfigError> {
    let account = keyring_account(backend, field);
    keyring::Entry::new(KEYRING_SERVICE, &account)?.set_password(value)?;
    debug!(account, "stored secret in keyring");
    Ok(())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "trident", "trident").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("trident");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// A missing file is not an error. Environment keys nest with a double
/// underscore: `TRIDENT_SDN_CONTROLLER__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
