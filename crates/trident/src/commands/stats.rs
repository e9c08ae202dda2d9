//! Aggregate traffic counters.

use trident_core::{ControllerManager, NetworkStats};

use crate::error::CliError;
use crate::output;

use super::Context;

fn detail(s: &NetworkStats) -> String {
    [
        format!("Bytes in:     {}", s.bytes_in),
        format!("Bytes out:    {}", s.bytes_out),
        format!("Packets in:   {}", s.packets_in),
        format!("Packets out:  {}", s.packets_out),
        format!("Connections:  {}", s.active_connections),
        format!("Sampled at:   {}", s.timestamp.to_rfc3339()),
    ]
    .join("\n")
}

pub async fn handle(manager: &ControllerManager, ctx: &Context) -> Result<(), CliError> {
    manager.connect().await?;
    let stats = manager.get_stats().await?;

    let out = output::render_single(ctx.format, &stats, detail, |s| {
        s.active_connections.to_string()
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
