//! Counter operations: read, apply the cycle, mutate, write back.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::CounterConfig;
use crate::counter::Counter;
use crate::cycle;
use crate::error::{CounterError, Result};
use crate::store::CounterStore;

/// What a single invocation asks of a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Show,
    Add(i64),
    Subtract(i64),
    Set(i64),
    Reset,
    Delete,
    ConfigureCycle { cycle: String, cycle_in: String },
    RemoveCycle,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Show => "show",
            Operation::Add(_) => "add",
            Operation::Subtract(_) => "subtract",
            Operation::Set(_) => "set",
            Operation::Reset => "reset",
            Operation::Delete => "delete",
            Operation::ConfigureCycle { .. } => "cycle",
            Operation::RemoveCycle => "remove cycle",
        }
    }

    fn is_disabled(&self, config: &CounterConfig) -> bool {
        match self {
            Operation::Show => false,
            Operation::Add(_) => config.never_add,
            Operation::Subtract(_) => config.never_subtract,
            Operation::Set(_) => config.never_set_to,
            Operation::Reset => config.never_reset,
            Operation::Delete => config.never_delete,
            Operation::ConfigureCycle { .. } => config.never_cycle,
            Operation::RemoveCycle => config.never_delete_cycle,
        }
    }
}

/// Result of [`execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The counter after the operation (unchanged for [`Operation::Show`]).
    Value(Counter),
    Deleted { path: PathBuf, removed: bool },
    CycleConfigured {
        counter: Counter,
        /// Next calendar occurrence, when the cycle has a calendar form.
        next: Option<DateTime<Local>>,
    },
    CycleRemoved(Counter),
    /// A destructive operation was requested without confirmation; nothing changed.
    ConfirmationRequired { operation: Operation, counter: Counter },
}

/// Run `operation` against the counter stored at `path`.
///
/// `confirmed` (or `always_yes` in the config) gates reset and delete.
pub fn execute(
    store: &CounterStore,
    config: &CounterConfig,
    path: &Path,
    operation: Operation,
    confirmed: bool,
) -> Result<Outcome> {
    if operation.is_disabled(config) {
        return Err(CounterError::OperationDisabled(operation.name()));
    }
    let confirmed = confirmed || config.always_yes;

    match operation {
        Operation::Delete => {
            if !confirmed {
                let counter = store.read(path)?;
                return Ok(Outcome::ConfirmationRequired { operation, counter });
            }
            let removed = store.delete(path)?;
            info!(path = %path.display(), removed, "counter deleted");
            Ok(Outcome::Deleted {
                path: path.to_path_buf(),
                removed,
            })
        }
        Operation::Show => Ok(Outcome::Value(load(store, path, false)?)),
        Operation::Add(n) => update(store, path, |c| c.add(n)).map(Outcome::Value),
        Operation::Subtract(n) => update(store, path, |c| c.subtract(n)).map(Outcome::Value),
        Operation::Set(n) => update(store, path, |c| c.set(n)).map(Outcome::Value),
        Operation::Reset => {
            if !confirmed {
                let counter = load(store, path, false)?;
                return Ok(Outcome::ConfirmationRequired { operation, counter });
            }
            update(store, path, Counter::reset).map(Outcome::Value)
        }
        Operation::ConfigureCycle { cycle, cycle_in } => {
            let next = validate_cycle(&cycle, &cycle_in)?;
            let mut counter = load(store, path, true)?;
            counter.set_cycle(&cycle, &cycle_in);
            store.write(&counter)?;
            info!(path = %path.display(), cycle = %counter.cycle, cycle_in = %counter.cycle_in, "cycle configured");
            Ok(Outcome::CycleConfigured { counter, next })
        }
        Operation::RemoveCycle => {
            let mut counter = load(store, path, true)?;
            counter.clear_cycle();
            store.write(&counter)?;
            info!(path = %path.display(), "cycle removed");
            Ok(Outcome::CycleRemoved(counter))
        }
    }
}

/// Check that a cycle can drive resets, and find its next calendar occurrence.
///
/// The elapsed-interval form must resolve, since that is what decides resets.
/// Calendar kinds given a parameter must also parse as a schedule; without a
/// parameter there is nothing to display.
pub fn validate_cycle(cycle: &str, cycle_in: &str) -> Result<Option<DateTime<Local>>> {
    cycle::reset_interval(cycle, cycle_in)?;
    if cycle::is_calendar_kind(cycle) && !cycle_in.trim().is_empty() {
        return cycle::next_occurrence(cycle, cycle_in).map(Some);
    }
    Ok(None)
}

/// Read the counter and zero it when its cycle has elapsed.
///
/// With `tolerate_bad_cycle`, an unusable stored cycle is logged instead of
/// failing, so the cycle can still be replaced or removed.
fn load(store: &CounterStore, path: &Path, tolerate_bad_cycle: bool) -> Result<Counter> {
    let mut counter = store.read(path)?;
    if !counter.has_cycle() {
        return Ok(counter);
    }

    match cycle::is_due(path, &counter.cycle, &counter.cycle_in) {
        Ok(true) => {
            if counter.value != 0 {
                info!(
                    path = %path.display(),
                    cycle = %counter.cycle,
                    previous = counter.value,
                    "cycle elapsed, resetting counter"
                );
            }
            counter.reset();
        }
        Ok(false) => {}
        Err(e @ (CounterError::InvalidParameter { .. } | CounterError::UnknownCycleKind(_)))
            if tolerate_bad_cycle =>
        {
            warn!(path = %path.display(), error = %e, "ignoring unusable stored cycle");
        }
        Err(e) => return Err(e),
    }
    Ok(counter)
}

fn update(store: &CounterStore, path: &Path, apply: impl FnOnce(&mut Counter)) -> Result<Counter> {
    let mut counter = load(store, path, false)?;
    apply(&mut counter);
    store.write(&counter)?;
    Ok(counter)
}
