//! Status command: which backend is active and how each one answers.

use serde::Serialize;
use tabled::Tabled;
use trident_core::{AdapterStatus, ControllerManager, ManagerState};

use crate::error::CliError;
use crate::output;

use super::{Context, state_label};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Health")]
    health: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    state: ManagerState,
    backends: Vec<AdapterStatus>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(manager: &ControllerManager, ctx: &Context) -> Result<(), CliError> {
    manager.connect().await?;

    let report = StatusReport {
        state: manager.state(),
        backends: manager.status().await,
    };

    let color = ctx.color;
    let out = output::render_single(
        ctx.format,
        &report,
        |r| {
            let rows: Vec<StatusRow> = r
                .backends
                .iter()
                .map(|b| StatusRow {
                    marker: if b.active { "*" } else { "" },
                    backend: b.kind.to_string(),
                    health: output::health_label(b.healthy, color),
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            format!("State: {}\n{table}", state_label(r.state))
        },
        |r| {
            r.backends
                .iter()
                .find(|b| b.active)
                .map(|b| b.kind.to_string())
                .unwrap_or_default()
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
