//! Config subcommand handlers. None of these touch a backend.

use std::io::BufRead;
use std::path::Path;

use trident_config::{self as config, Config};
use trident_core::ControllerKind;

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with every plaintext secret replaced by a mask.
fn redacted(cfg: &Config) -> Config {
    let mask = |secret: Option<&str>| secret.map(|_| MASK.to_string());
    let mut out = cfg.clone();
    if let Some(ref mut s) = out.sdn_controller {
        s.password = mask(s.password.as_deref());
    }
    if let Some(ref mut f) = out.firewall_appliance {
        f.api_key = mask(f.api_key.as_deref());
        f.api_secret = mask(f.api_secret.as_deref());
    }
    if let Some(ref mut r) = out.router_os {
        r.password = mask(r.password.as_deref());
    }
    out
}

/// Secret fields each backend reads from the keyring.
fn secret_fields(kind: ControllerKind) -> &'static [&'static str] {
    match kind {
        ControllerKind::SdnController | ControllerKind::RouterOs => &["password"],
        ControllerKind::FirewallAppliance => &["api_secret"],
    }
}

fn read_secret(input: impl BufRead) -> Result<String, CliError> {
    let line = input.lines().next().transpose()?.unwrap_or_default();
    let secret = line.trim_end_matches(['\r', '\n']).to_owned();
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "secret".into(),
            reason: "no value on stdin".into(),
        });
    }
    Ok(secret)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, path: &Path, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_from(path)?);
            let out = output::render_single(
                ctx.format,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |_| path.display().to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config(&Config::example(), path)?;
            output::print_output(&format!("Wrote {}", path.display()), ctx.quiet);
            Ok(())
        }

        ConfigCommand::SetSecret { backend, field } => {
            let allowed = secret_fields(backend);
            if !allowed.contains(&field.as_str()) {
                return Err(CliError::Validation {
                    field: "field".into(),
                    reason: format!("{backend} secrets are: {}", allowed.join(", ")),
                });
            }
            let secret = read_secret(std::io::stdin().lock())?;
            config::store_secret(backend, &field, &secret)?;
            output::print_output(
                &format!("Stored {field} for {backend} in the system keyring"),
                ctx.quiet,
            );
            Ok(())
        }
    }
}
