use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted counter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Current count. Arithmetic saturates at the `i64` bounds.
    pub value: i64,
    /// Backing file of this counter.
    pub path: PathBuf,
    /// When the counter was first materialised.
    pub created_at: DateTime<Utc>,
    /// Cycle kind for automatic reset; empty when none is configured.
    #[serde(default)]
    pub cycle: String,
    /// Cycle parameter (e.g. `noon`, `monday`, `90`).
    #[serde(default)]
    pub cycle_in: String,
}

impl Counter {
    /// A zero counter backed by `path`, created now.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            value: 0,
            path: path.into(),
            created_at: Utc::now(),
            cycle: String::new(),
            cycle_in: String::new(),
        }
    }

    /// A counter recovered from a bare-integer legacy record.
    pub fn from_legacy(path: &Path, value: i64) -> Self {
        Self {
            value,
            ..Self::new(path)
        }
    }

    pub fn has_cycle(&self) -> bool {
        !self.cycle.is_empty()
    }

    pub fn add(&mut self, quantity: i64) {
        self.value = self.value.saturating_add(quantity);
    }

    pub fn subtract(&mut self, quantity: i64) {
        self.value = self.value.saturating_sub(quantity);
    }

    pub fn set(&mut self, value: i64) {
        self.value = value;
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    pub fn set_cycle(&mut self, cycle: &str, cycle_in: &str) {
        self.cycle = cycle.trim().to_ascii_lowercase();
        self.cycle_in = cycle_in.trim().to_string();
    }

    pub fn clear_cycle(&mut self) {
        self.cycle.clear();
        self.cycle_in.clear();
    }
}
