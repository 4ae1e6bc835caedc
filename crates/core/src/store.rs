use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::CounterConfig;
use crate::counter::Counter;
use crate::error::{CounterError, Result};
use crate::guard;
use crate::paths::ensure_dir;

/// Filesystem-backed counter persistence.
///
/// Each counter lives in its own file holding a pretty-printed JSON record.
/// A file holding nothing but a decimal integer is read as a legacy record
/// and upgraded on the next write.
///
/// Every write follows the same cycle: lift the read-only guard, replace the
/// content through a sibling temp file and a rename, then put the guard back.
/// The store assumes a single writer per file; there is no locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterStore {
    force: bool,
}

impl CounterStore {
    /// `force` allows writes to create a missing parent directory.
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.use_force)
    }

    /// Load the counter at `path`; a missing file is a fresh zero counter.
    pub fn read(&self, path: &Path) -> Result<Counter> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "counter file missing, starting at 0");
                return Ok(Counter::new(path));
            }
            Err(e) => return Err(CounterError::read(path, e)),
        };
        decode(path, &bytes)
    }

    /// Persist the full record to `counter.path`.
    ///
    /// Either the whole record replaces the old content or the old content is
    /// left untouched. A failure to re-apply the guard afterwards is only
    /// logged; the value is already on disk.
    pub fn write(&self, counter: &Counter) -> Result<()> {
        let path = counter.path.as_path();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        ensure_dir(dir, self.force)?;

        let bytes = serde_json::to_vec_pretty(counter)
            .map_err(|e| CounterError::write(path, e.into()))?;

        let original = match guard::lift(path) {
            Ok(original) => original,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not lift permission guard");
                None
            }
        };

        let tmp = temp_path(path);
        if let Err(e) = replace(&tmp, path, &bytes) {
            fs::remove_file(&tmp).ok();
            if original.is_some() {
                reapply_guard(path, original.as_ref());
            }
            return Err(e);
        }

        reapply_guard(path, original.as_ref());
        debug!(path = %path.display(), value = counter.value, "counter written");
        Ok(())
    }

    /// Remove the counter file. Returns `false` when there was nothing to remove.
    pub fn delete(&self, path: &Path) -> Result<bool> {
        match guard::lift(path) {
            Ok(None) => return Ok(false),
            Ok(Some(_)) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not lift permission guard"),
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "counter deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CounterError::write(path, e)),
        }
    }
}

/// Decode a counter record, falling back to the legacy bare-integer format.
///
/// The returned counter's `path` is always `path`, whatever the record says.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<Counter> {
    match serde_json::from_slice::<Counter>(bytes) {
        Ok(mut counter) => {
            counter.path = path.to_path_buf();
            Ok(counter)
        }
        Err(json_err) => {
            let text = String::from_utf8_lossy(bytes);
            let value: i64 = text
                .trim()
                .parse()
                .map_err(|e| CounterError::read(path, e))?;
            debug!(path = %path.display(), error = %json_err, "read legacy counter record");
            Ok(Counter::from_legacy(path, value))
        }
    }
}

/// Write all of `bytes`, rejecting a first write that transfers nothing.
fn write_record<W: Write>(writer: &mut W, path: &Path, bytes: &[u8]) -> Result<()> {
    let written = writer
        .write(bytes)
        .map_err(|e| CounterError::write(path, e))?;
    if written == 0 && !bytes.is_empty() {
        return Err(CounterError::ZeroLengthWrite(path.to_path_buf()));
    }
    writer
        .write_all(&bytes[written..])
        .map_err(|e| CounterError::write(path, e))
}

fn replace(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp)
        .map_err(|e| CounterError::write(path, e))?;
    write_record(&mut file, path, bytes)?;
    file.sync_all().map_err(|e| CounterError::write(path, e))?;
    drop(file);
    fs::rename(tmp, path).map_err(|e| CounterError::write(path, e))
}

fn reapply_guard(path: &Path, original: Option<&fs::Permissions>) {
    if let Err(source) = guard::protect(path, original) {
        let err = CounterError::PermissionGuard {
            path: path.to_path_buf(),
            source,
        };
        warn!("{err}");
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "counter".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
