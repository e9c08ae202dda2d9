//! Flow listing.

use tabled::Tabled;
use trident_core::{ControllerManager, NetworkFlow};

use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct FlowRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Bytes")]
    bytes: u64,
    #[tabled(rename = "Packets")]
    packets: u64,
    #[tabled(rename = "Started")]
    started: String,
}

fn row(f: &NetworkFlow) -> FlowRow {
    FlowRow {
        source: format!("{}:{}", f.source_ip, f.source_port),
        destination: format!("{}:{}", f.destination_ip, f.destination_port),
        protocol: f.protocol.clone(),
        bytes: f.bytes_transferred,
        packets: f.packets_transferred,
        started: f.start_time.format("%H:%M:%S").to_string(),
    }
}

pub async fn handle(manager: &ControllerManager, ctx: &Context) -> Result<(), CliError> {
    manager.connect().await?;
    let flows = manager.get_flows().await?;

    let out = output::render_list(ctx.format, &flows, row, |f| f.id.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
