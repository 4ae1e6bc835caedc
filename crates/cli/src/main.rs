mod cli;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use counter_core::config::load_dotenv;
use counter_core::paths::{ensure_dir, resolve_counter_path};
use counter_core::{execute, CounterConfig, CounterStore};

use crate::cli::CliArgs;
use crate::output::Terminal;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the counter value.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new(args.json);

    match run(&args, &terminal) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if terminal.print_error(&format!("{e:#}")).is_err() {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs, terminal: &Terminal) -> Result<bool> {
    load_dotenv();
    let env = CounterConfig::from_env().context("invalid environment configuration")?;
    let config = args.apply_overrides(env);
    config.log_summary();

    if args.env {
        terminal.print_env(&config.env_summary())?;
        return Ok(true);
    }
    if args.cycle_in.is_some() && args.cycle.is_none() {
        warn!("--in has no effect without --cycle");
    }

    let path = counter_path(args, &config)?;
    let store = CounterStore::from_config(&config);
    let operation = args.operation(config.quantity);
    debug!(operation = operation.name(), path = %path.display(), "running");

    let outcome = execute(&store, &config, &path, operation, args.yes)
        .with_context(|| format!("counter {}", args.label()))?;
    terminal.print_outcome(args.label(), &outcome)
}

/// Locate the backing file, checking the counter directory when it is used.
fn counter_path(args: &CliArgs, config: &CounterConfig) -> Result<PathBuf> {
    let uses_dir = args
        .file
        .as_deref()
        .map_or(true, |f| Path::new(f.trim()).is_relative());
    if uses_dir {
        ensure_dir(&config.dir, config.use_force).context("counter directory unavailable")?;
    }
    resolve_counter_path(&config.dir, args.name.as_deref(), args.file.as_deref())
        .context("cannot determine counter file")
}
