use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default directory for name-addressed counters.
pub const DEFAULT_COUNTER_DIR: &str = "/tmp/.counters";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid integer value for {var}: {value}")]
    InvalidInteger { var: &'static str, value: String },

    #[error("invalid boolean value for {var}: {value} (expected 1, 0, true or false)")]
    InvalidFlag { var: &'static str, value: String },
}

// ── Environment table ─────────────────────────────────────────

/// Value type an environment variable is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    Path,
    Flag,
    Integer,
}

/// Config field an environment variable sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvField {
    Dir,
    Quantity,
    UseForce,
    AlwaysYes,
    NeverAdd,
    NeverSubtract,
    NeverSetTo,
    NeverReset,
    NeverDelete,
    NeverCycle,
    NeverDeleteCycle,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
    pub var: &'static str,
    pub kind: EnvKind,
    pub field: EnvField,
}

const fn bind(var: &'static str, kind: EnvKind, field: EnvField) -> EnvBinding {
    EnvBinding { var, kind, field }
}

/// Every environment variable the tool reads.
pub const ENV_BINDINGS: &[EnvBinding] = &[
    bind("COUNTER_DIR", EnvKind::Path, EnvField::Dir),
    bind("COUNTER_QUANTITY", EnvKind::Integer, EnvField::Quantity),
    bind("COUNTER_USE_FORCE", EnvKind::Flag, EnvField::UseForce),
    bind("COUNTER_ALWAYS_YES", EnvKind::Flag, EnvField::AlwaysYes),
    bind("COUNTER_NEVER_ADD", EnvKind::Flag, EnvField::NeverAdd),
    bind("COUNTER_NEVER_SUBTRACT", EnvKind::Flag, EnvField::NeverSubtract),
    bind("COUNTER_NEVER_SET_TO", EnvKind::Flag, EnvField::NeverSetTo),
    bind("COUNTER_NEVER_RESET", EnvKind::Flag, EnvField::NeverReset),
    bind("COUNTER_NEVER_DELETE", EnvKind::Flag, EnvField::NeverDelete),
    bind("COUNTER_NEVER_CYCLE", EnvKind::Flag, EnvField::NeverCycle),
    bind("COUNTER_NEVER_DELETE_CYCLE", EnvKind::Flag, EnvField::NeverDeleteCycle),
];

/// A parsed environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Path(PathBuf),
    Flag(bool),
    Integer(i64),
}

impl EnvValue {
    fn parse(binding: &EnvBinding, raw: &str) -> Result<Self, ConfigError> {
        match binding.kind {
            EnvKind::Path => Ok(EnvValue::Path(PathBuf::from(raw))),
            EnvKind::Integer => raw
                .trim()
                .parse()
                .map(EnvValue::Integer)
                .map_err(|_| ConfigError::InvalidInteger {
                    var: binding.var,
                    value: raw.to_string(),
                }),
            EnvKind::Flag => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Ok(EnvValue::Flag(true)),
                "0" | "false" => Ok(EnvValue::Flag(false)),
                _ => Err(ConfigError::InvalidFlag {
                    var: binding.var,
                    value: raw.to_string(),
                }),
            },
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Settings resolved once at startup and passed by reference from there on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    pub dir: PathBuf,
    pub quantity: i64,
    pub use_force: bool,
    pub always_yes: bool,
    pub never_add: bool,
    pub never_subtract: bool,
    pub never_set_to: bool,
    pub never_reset: bool,
    pub never_delete: bool,
    pub never_cycle: bool,
    pub never_delete_cycle: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_COUNTER_DIR),
            quantity: 1,
            use_force: false,
            always_yes: false,
            never_add: false,
            never_subtract: false,
            never_set_to: false,
            never_reset: false,
            never_delete: false,
            never_cycle: false,
            never_delete_cycle: false,
        }
    }
}

impl CounterConfig {
    /// Build config from process environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build config from an arbitrary variable lookup. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for binding in ENV_BINDINGS {
            let Some(raw) = lookup(binding.var).filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = EnvValue::parse(binding, &raw)?;
            config.apply(binding.field, value);
        }
        Ok(config)
    }

    fn apply(&mut self, field: EnvField, value: EnvValue) {
        match (field, value) {
            (EnvField::Dir, EnvValue::Path(dir)) => self.dir = dir,
            (EnvField::Quantity, EnvValue::Integer(n)) => self.quantity = n,
            (field, EnvValue::Flag(on)) => match self.flag_mut(field) {
                Some(slot) => *slot = on,
                None => tracing::warn!(?field, "flag value for a non-flag field"),
            },
            (field, value) => {
                tracing::warn!(?field, ?value, "environment value does not match its field");
            }
        }
    }

    fn flag_mut(&mut self, field: EnvField) -> Option<&mut bool> {
        match field {
            EnvField::UseForce => Some(&mut self.use_force),
            EnvField::AlwaysYes => Some(&mut self.always_yes),
            EnvField::NeverAdd => Some(&mut self.never_add),
            EnvField::NeverSubtract => Some(&mut self.never_subtract),
            EnvField::NeverSetTo => Some(&mut self.never_set_to),
            EnvField::NeverReset => Some(&mut self.never_reset),
            EnvField::NeverDelete => Some(&mut self.never_delete),
            EnvField::NeverCycle => Some(&mut self.never_cycle),
            EnvField::NeverDeleteCycle => Some(&mut self.never_delete_cycle),
            EnvField::Dir | EnvField::Quantity => None,
        }
    }

    fn value_of(&self, field: EnvField) -> String {
        match field {
            EnvField::Dir => self.dir.display().to_string(),
            EnvField::Quantity => self.quantity.to_string(),
            EnvField::UseForce => self.use_force.to_string(),
            EnvField::AlwaysYes => self.always_yes.to_string(),
            EnvField::NeverAdd => self.never_add.to_string(),
            EnvField::NeverSubtract => self.never_subtract.to_string(),
            EnvField::NeverSetTo => self.never_set_to.to_string(),
            EnvField::NeverReset => self.never_reset.to_string(),
            EnvField::NeverDelete => self.never_delete.to_string(),
            EnvField::NeverCycle => self.never_cycle.to_string(),
            EnvField::NeverDeleteCycle => self.never_delete_cycle.to_string(),
        }
    }

    /// Resolved value of every environment variable, keyed by name.
    pub fn env_summary(&self) -> BTreeMap<&'static str, String> {
        ENV_BINDINGS
            .iter()
            .map(|b| (b.var, self.value_of(b.field)))
            .collect()
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            dir = %self.dir.display(),
            quantity = self.quantity,
            force = self.use_force,
            always_yes = self.always_yes,
            "config loaded"
        );
    }
}
