//! Command dispatch: bridges CLI args -> manager calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod flows;
pub mod qos;
pub mod stats;
pub mod status;
pub mod watch;

use trident_core::{ControllerManager, ManagerState};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Presentation settings shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    pub fn new(global: &GlobalOpts, format: OutputFormat) -> Self {
        Self {
            format,
            color: output::should_color(global.color),
            quiet: global.quiet,
        }
    }
}

/// Dispatch a manager-bound command to the appropriate handler.
///
/// Handlers connect the manager themselves so they can validate input
/// first; the caller disconnects afterwards.
pub async fn dispatch(
    cmd: Command,
    manager: &ControllerManager,
    ctx: &Context,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(manager, ctx).await,
        Command::Devices => devices::handle(manager, ctx).await,
        Command::Flows => flows::handle(manager, ctx).await,
        Command::Stats => stats::handle(manager, ctx).await,
        Command::Qos(args) => qos::handle(manager, args, ctx).await,
        Command::Watch => watch::handle(manager, ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Human label for a manager state.
pub fn state_label(state: ManagerState) -> String {
    match state {
        ManagerState::Disconnected => "disconnected".into(),
        ManagerState::Connecting => "connecting".into(),
        ManagerState::Active(kind) => format!("active ({kind})"),
        ManagerState::NoActiveAvailable => "no active controller".into(),
    }
}
