use std::path::PathBuf;

use clap::Parser;
use counter_core::{CounterConfig, Operation};

/// Durable named counters with optional automatic reset cycles.
///
/// Each run reads the counter, applies at most one operation and writes it
/// back. Without an operation flag the current value is printed.
#[derive(Parser, Debug)]
#[command(name = "counter", version, about = "Durable named counters")]
pub struct CliArgs {
    /// Counter name; the backing file is derived from it inside the counter directory
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Counter directory (overrides COUNTER_DIR)
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,

    /// Explicit counter file; relative paths are taken inside the counter directory
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Add the quantity to the counter
    #[arg(short = 'a', long)]
    pub add: bool,

    /// Subtract the quantity from the counter
    #[arg(short = 's', long)]
    pub sub: bool,

    /// Set the counter to this value
    #[arg(short = 'S', long, allow_negative_numbers = true)]
    pub set: Option<i64>,

    /// Reset the counter to 0 (needs --yes)
    #[arg(short = 'R', long)]
    pub reset: bool,

    /// Delete the counter file (needs --yes)
    #[arg(short = 'D', long)]
    pub delete: bool,

    /// Print the full counter record as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Create the counter directory when it is missing (overrides COUNTER_USE_FORCE)
    #[arg(short = 'F', long)]
    pub force: bool,

    /// Amount for --add and --sub (overrides COUNTER_QUANTITY)
    #[arg(short = 'q', long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// Reset cycle: hourly, daily, weekly, monthly, annually, every, <N>min, ...
    #[arg(short = 'c', long)]
    pub cycle: Option<String>,

    /// Cycle parameter: a time, weekday, day of month, MM-DD or minute count
    #[arg(short = 'i', long = "in")]
    pub cycle_in: Option<String>,

    /// Print the resolved environment configuration and exit
    #[arg(short = 'e', long)]
    pub env: bool,

    /// Confirm destructive operations (overrides COUNTER_ALWAYS_YES)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Remove the counter's reset cycle
    #[arg(short = 'r', long)]
    pub rmcc: bool,
}

impl CliArgs {
    /// Apply flag values on top of the environment configuration.
    pub fn apply_overrides(&self, mut config: CounterConfig) -> CounterConfig {
        if let Some(dir) = &self.dir {
            config.dir = dir.clone();
        }
        if let Some(quantity) = self.quantity {
            config.quantity = quantity;
        }
        config.use_force |= self.force;
        config.always_yes |= self.yes;
        config
    }

    /// The single operation this invocation performs.
    ///
    /// Precedence: delete, remove cycle, configure cycle, reset, set, then
    /// add/subtract. Asking for both add and subtract nets out to a show.
    pub fn operation(&self, quantity: i64) -> Operation {
        if self.delete {
            return Operation::Delete;
        }
        if self.rmcc {
            return Operation::RemoveCycle;
        }
        if let Some(cycle) = &self.cycle {
            return Operation::ConfigureCycle {
                cycle: cycle.clone(),
                cycle_in: self.cycle_in.clone().unwrap_or_default(),
            };
        }
        if self.reset {
            return Operation::Reset;
        }
        if let Some(value) = self.set {
            return Operation::Set(value);
        }
        match (self.add, self.sub) {
            (true, false) => Operation::Add(quantity),
            (false, true) => Operation::Subtract(quantity),
            _ => Operation::Show,
        }
    }

    /// Name shown in messages: the counter name, else the file argument.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.file.as_deref())
            .unwrap_or("counter")
    }
}
