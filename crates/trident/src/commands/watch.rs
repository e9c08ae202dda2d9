//! Long-running failover monitor.
//!
//! Keeps the manager connected and prints each change of active backend
//! until interrupted.

use owo_colors::OwoColorize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use trident_core::{ControllerKind, ControllerManager, FailoverEvent};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::{Context, state_label};

fn event_line(event: &FailoverEvent, color: bool) -> String {
    let label = |k: Option<ControllerKind>| k.map_or_else(|| "none".into(), |k| k.to_string());
    let from = label(event.from);
    let to = label(event.to);
    let at = event.at.format("%Y-%m-%d %H:%M:%S");
    if !color {
        return format!("{at}  {from} -> {to}");
    }
    if event.to.is_some() {
        format!("{}  {from} -> {}", at.dimmed(), to.green())
    } else {
        format!("{}  {from} -> {}", at.dimmed(), to.red())
    }
}

fn render_event(event: &FailoverEvent, ctx: &Context) -> Result<String, CliError> {
    match ctx.format {
        OutputFormat::Table | OutputFormat::Plain => Ok(event_line(event, ctx.color)),
        // One document per event keeps the stream line-oriented.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(event, true),
        OutputFormat::Yaml => output::render_yaml(event).map(|y| format!("---\n{y}")),
    }
}

pub async fn handle(manager: &ControllerManager, ctx: &Context) -> Result<(), CliError> {
    // Subscribe first so the initial selection is reported too.
    let mut events = manager.subscribe_failovers();
    manager.connect().await?;
    info!(state = %state_label(manager.state()), "watching for failover");

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => output::print_output(&render_event(&event, ctx)?, ctx.quiet),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "failover stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
