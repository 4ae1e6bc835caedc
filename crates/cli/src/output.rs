use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Local};
use counter_core::{Counter, Operation, Outcome};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde_json::json;

/// Color scheme for stderr messages. Stdout stays uncolored.
struct Colors;

impl Colors {
    const HINT: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
}

/// What one invocation prints, before it is printed.
#[derive(Debug, PartialEq, Eq)]
pub struct Report {
    pub stdout: String,
    pub hint: Option<String>,
    pub success: bool,
}

impl Report {
    fn out(stdout: String) -> Self {
        Self {
            stdout,
            hint: None,
            success: true,
        }
    }
}

/// Renders outcomes to stdout (values, records) and stderr (hints, errors).
pub struct Terminal {
    json: bool,
}

impl Terminal {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print the outcome; returns whether the invocation succeeded.
    pub fn print_outcome(&self, label: &str, outcome: &Outcome) -> Result<bool> {
        let report = report(label, outcome, self.json)?;
        if !report.stdout.is_empty() {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", report.stdout)?;
            stdout.flush()?;
        }
        if let Some(hint) = &report.hint {
            self.print_colored(Colors::HINT, hint)?;
        }
        Ok(report.success)
    }

    /// Print the resolved environment table.
    pub fn print_env(&self, summary: &BTreeMap<&'static str, String>) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", env_report(summary, self.json)?)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&self, message: &str) -> Result<()> {
        self.print_colored(Colors::ERROR, &format!("Error: {message}"))
    }

    fn print_colored(&self, color: Color, text: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(color),
            Print(text),
            ResetColor,
            Print("\n"),
        )?;
        stderr.flush()?;
        Ok(())
    }
}

/// Build the output for `outcome`.
pub fn report(label: &str, outcome: &Outcome, json: bool) -> serde_json::Result<Report> {
    let report = match outcome {
        Outcome::Value(counter) => Report::out(value_text(counter, json)?),
        Outcome::CycleConfigured { counter, next } => {
            if json {
                Report::out(serde_json::to_string_pretty(&json!({
                    "counter": counter,
                    "next_reset": next.map(|n| n.to_rfc3339()),
                }))?)
            } else {
                Report::out(cycle_text(label, counter, next.as_ref()))
            }
        }
        Outcome::CycleRemoved(counter) => {
            if json {
                Report::out(serde_json::to_string_pretty(counter)?)
            } else {
                Report::out(format!("cycle removed from {label}"))
            }
        }
        Outcome::Deleted { path, removed } => {
            if json {
                Report::out(serde_json::to_string_pretty(&json!({
                    "path": path,
                    "deleted": removed,
                }))?)
            } else if *removed {
                Report::out(format!("counter {label} deleted"))
            } else {
                Report::out(format!("counter {label} did not exist"))
            }
        }
        Outcome::ConfirmationRequired { operation, counter } => Report {
            stdout: String::new(),
            hint: Some(confirmation_hint(label, operation, counter)),
            success: false,
        },
    };
    Ok(report)
}

fn value_text(counter: &Counter, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(counter)
    } else {
        Ok(counter.value.to_string())
    }
}

fn cycle_text(label: &str, counter: &Counter, next: Option<&DateTime<Local>>) -> String {
    let mut text = if counter.cycle_in.is_empty() {
        format!("counter {label} will reset {}", counter.cycle)
    } else {
        format!("counter {label} will reset {} at {}", counter.cycle, counter.cycle_in)
    };
    if let Some(next) = next {
        text.push_str(&format!("\nnext reset: {}", next.format("%Y-%m-%d %H:%M %Z")));
    }
    text
}

fn confirmation_hint(label: &str, operation: &Operation, counter: &Counter) -> String {
    match operation {
        Operation::Delete => format!(
            "deleting counter {label} ({}) when you re-run with --yes",
            counter.value
        ),
        _ => format!(
            "will reset counter {label} to 0 after you re-run with --yes (currently {})",
            counter.value
        ),
    }
}

fn env_report(summary: &BTreeMap<&'static str, String>, json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(summary);
    }
    Ok(summary
        .iter()
        .map(|(var, value)| format!("{var}={value}"))
        .collect::<Vec<_>>()
        .join("\n"))
}
