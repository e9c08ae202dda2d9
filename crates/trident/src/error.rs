//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use trident_config::ConfigError;
use trident_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const NO_ACTIVE: i32 = 8;
    pub const UPSTREAM: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Availability ─────────────────────────────────────────────────
    #[error("No controller could be connected")]
    #[diagnostic(
        code(trident::connection_failed),
        help(
            "Every configured backend failed:\n{failures}\n\
             Check reachability and credentials, then retry with -v for details."
        )
    )]
    ConnectionFailed { failures: String },

    #[error("No active controller available")]
    #[diagnostic(
        code(trident::no_active_controller),
        help("All backends failed their health check. Run: trident status")
    )]
    NoActiveController,

    #[error("No backends configured")]
    #[diagnostic(
        code(trident::no_backends),
        help(
            "Declare at least one backend in {path}\n\
             Create a starter file with: trident config init"
        )
    )]
    NoBackends { path: String },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("{kind} request failed: {message}")]
    #[diagnostic(
        code(trident::upstream),
        help("The active controller rejected or failed the call. No failover was attempted.")
    )]
    Upstream { kind: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(trident::validation))]
    Validation { field: String, reason: String },

    #[error("No {field} configured for {backend}")]
    #[diagnostic(
        code(trident::missing_secret),
        help(
            "Set the variable named by `{field}_env`, store it with\n\
             `trident config set-secret {backend} {field}`, or put `{field}` in the config file."
        )
    )]
    MissingSecret { backend: String, field: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Config file already exists at {path}")]
    #[diagnostic(code(trident::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(trident::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(trident::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NoActiveController | Self::NoBackends { .. } => exit_code::NO_ACTIVE,
            Self::Upstream { .. } => exit_code::UPSTREAM,
            Self::Validation { .. } | Self::MissingSecret { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            Self::Config(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Connection { failures } => CliError::ConnectionFailed {
                failures: failures
                    .iter()
                    .map(|f| format!("  - {f}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            CoreError::NoActiveController | CoreError::NotConnected => {
                CliError::NoActiveController
            }
            CoreError::VendorApi { kind, source } => CliError::Upstream {
                kind: kind.to_string(),
                message: source.to_string(),
            },
            CoreError::Validation { message } => CliError::Validation {
                field: "policy".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::MissingSecret { backend, field } => {
                CliError::MissingSecret { backend, field }
            }
            other => CliError::Config(Box::new(other)),
        }
    }
}
