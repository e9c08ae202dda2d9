//! Device listing.

use tabled::Tabled;
use trident_core::{ControllerManager, NetworkDevice};

use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn row(d: &NetworkDevice, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.clone(),
        name: d.name.clone(),
        dtype: d.device_type.clone(),
        ip: d.ip_address.clone(),
        status: output::status_label(d.status, color),
        last_seen: d.last_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

pub async fn handle(manager: &ControllerManager, ctx: &Context) -> Result<(), CliError> {
    manager.connect().await?;
    let devices = manager.get_devices().await?;

    let out = output::render_list(
        ctx.format,
        &devices,
        |d| row(d, ctx.color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
