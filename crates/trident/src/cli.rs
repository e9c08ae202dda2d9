//! Clap derive structures for the `trident` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use trident_core::ControllerKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// trident -- one network, three controllers, always one answering
#[derive(Debug, Parser)]
#[command(
    name = "trident",
    version,
    about = "Query and shape a network through whichever controller is healthy",
    long_about = "Talks to an SDN controller, a firewall appliance, and a RouterOS\n\
        router through one interface. The first healthy backend in failover\n\
        order answers every command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "TRIDENT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides `defaults.output` in the config file)
    #[arg(long, short = 'o', env = "TRIDENT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which backend is active and how each one answers
    #[command(alias = "st")]
    Status,

    /// List devices known to the active controller
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// List active traffic flows
    #[command(alias = "f")]
    Flows,

    /// Show aggregate traffic counters
    Stats,

    /// Manage QoS policies
    Qos(QosArgs),

    /// Stay connected and print failover events as they happen
    #[command(alias = "w")]
    Watch,

    /// Manage CLI configuration and stored secrets
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── QoS ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QosArgs {
    #[command(subcommand)]
    pub command: QosCommand,
}

#[derive(Debug, Subcommand)]
pub enum QosCommand {
    /// Apply a policy through the active controller
    Apply(QosApplyArgs),
}

#[derive(Debug, Args)]
pub struct QosApplyArgs {
    /// Policy identifier
    #[arg(long)]
    pub id: String,

    /// Human-readable policy name
    #[arg(long)]
    pub name: String,

    /// Device, interface, or address the policy shapes
    #[arg(long)]
    pub target: String,

    /// Guaranteed bandwidth in Mbps
    #[arg(long, default_value = "0")]
    pub min: u32,

    /// Bandwidth ceiling in Mbps
    #[arg(long)]
    pub max: u32,

    /// Priority, 1 (highest) to 5
    #[arg(long, default_value = "3")]
    pub priority: u8,

    /// Protocol to match (tcp, udp, icmp, ...)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Destination port to match (repeatable)
    #[arg(long = "port", value_name = "PORT")]
    pub ports: Vec<u16>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the resolved configuration with secrets masked
    Show,

    /// Write a starter config declaring every backend
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store a backend secret in the system keyring (value read from stdin)
    SetSecret {
        /// Backend the secret belongs to
        #[arg(value_parser = parse_kind)]
        backend: ControllerKind,

        /// Secret field (`password` or `api_secret`)
        field: String,
    },
}

fn parse_kind(raw: &str) -> Result<ControllerKind, String> {
    raw.parse().map_err(|_| {
        let known: Vec<String> = ControllerKind::DEFAULT_ORDER
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("unknown backend '{raw}' (expected one of: {})", known.join(", "))
    })
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
