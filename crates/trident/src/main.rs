mod cli;
mod commands;
mod error;
mod output;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use trident_config::Config;
use trident_core::ControllerManager;

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.log_json);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so rendered output on stdout stays pipeable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(trident_config::config_path);

    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => {
            let ctx = Context::new(&cli.global, cli.global.output.unwrap_or(OutputFormat::Table));
            commands::config_cmd::handle(args, &path, &ctx)
        }

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "trident", &mut std::io::stdout());
            Ok(())
        }

        // All other commands go through the failover manager
        cmd => {
            let cfg = trident_config::load_config_from(&path)?;
            let ctx = Context::new(&cli.global, resolve_format(&cli.global, &cfg));
            let manager = build_manager(&cfg, &path)?;

            tracing::debug!(command = ?cmd, backends = ?manager.kinds(), "dispatching command");
            let result = commands::dispatch(cmd, &manager, &ctx).await;
            manager.disconnect().await;
            result
        }
    }
}

/// `--output` wins, then `defaults.output` from the config file.
fn resolve_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
            tracing::warn!(output = %cfg.defaults.output, "unknown default output format");
            OutputFormat::Table
        })
    })
}

/// Resolve credentials and build an unconnected manager.
fn build_manager(cfg: &Config, path: &std::path::Path) -> Result<ControllerManager, CliError> {
    let manager_config = cfg.to_manager_config()?;
    if manager_config.configured_kinds().is_empty() {
        return Err(CliError::NoBackends {
            path: path.display().to_string(),
        });
    }
    Ok(ControllerManager::new(&manager_config)?)
}
