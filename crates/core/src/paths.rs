//! Counter file location helpers.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha512};
use tracing::debug;

use crate::error::{CounterError, Result};

/// Make sure `dir` exists, creating it only when `force` is set.
pub fn ensure_dir(dir: &Path, force: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if !force {
        return Err(CounterError::DirectoryMissing(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir).map_err(|e| CounterError::write(dir, e))?;
    debug!(dir = %dir.display(), "created counter directory");
    Ok(())
}

/// Resolve symlinks to the real path, falling back to `path` unchanged.
pub fn resolve_symlink(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// File name for a name-addressed counter.
///
/// Fixed slices of the SHA-512 hex digest of `name`, so the same name maps
/// to the same file on every run and platform.
pub fn counter_file_name(name: &str) -> String {
    let digest = Sha512::digest(name.as_bytes());
    let hex = format!("{digest:x}");
    format!(
        ".named.{}{}{}{}{}.counter",
        &hex[96..99],
        &hex[39..45],
        &hex[63..69],
        &hex[93..99],
        &hex[69..72]
    )
}

/// Backing file for a counter given by `file` or by `name` inside `dir`.
///
/// An explicit file wins; relative files are taken relative to `dir`.
pub fn resolve_counter_path(dir: &Path, name: Option<&str>, file: Option<&str>) -> Result<PathBuf> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let file = file.map(str::trim).filter(|f| !f.is_empty());

    let path = match (file, name) {
        (Some(file), _) => {
            let file = Path::new(file);
            if file.is_absolute() {
                file.to_path_buf()
            } else {
                dir.join(file)
            }
        }
        (None, Some(name)) => dir.join(counter_file_name(name)),
        (None, None) => return Err(CounterError::MissingCounterIdentity),
    };

    Ok(resolve_symlink(&path))
}
