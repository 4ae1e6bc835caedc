use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, CounterError>;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("invalid parameter {param:?} for {cycle} cycle: {reason}")]
    InvalidParameter {
        cycle: String,
        param: String,
        reason: String,
    },

    #[error("unknown cycle: {0}")]
    UnknownCycleKind(String),

    #[error("failed to read counter {}: {source}", .path.display())]
    Read { path: PathBuf, source: ReadSource },

    #[error("failed to write counter {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("wrote 0 bytes to {}", .0.display())]
    ZeroLengthWrite(PathBuf),

    #[error("directory {} does not exist", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("could not set permission guard on {}: {source}", .path.display())]
    PermissionGuard {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("a counter name or file is required")]
    MissingCounterIdentity,

    #[error("{0} operation is disabled by the environment")]
    OperationDisabled(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Underlying cause of a [`CounterError::Read`].
#[derive(Error, Debug)]
pub enum ReadSource {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid counter value: {0}")]
    Parse(#[from] std::num::ParseIntError),
}

impl CounterError {
    pub(crate) fn invalid_parameter(
        cycle: &str,
        param: &str,
        reason: impl Into<String>,
    ) -> Self {
        CounterError::InvalidParameter {
            cycle: cycle.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<ReadSource>) -> Self {
        CounterError::Read {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CounterError::Write {
            path: path.into(),
            source,
        }
    }
}
