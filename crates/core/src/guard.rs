//! Read-only permission guard around counter files.
//!
//! The guard is advisory: it makes edits by other programs fail visibly, but
//! it is not a lock and does nothing to serialise two runs of this tool.

use std::fs::{self, Permissions};
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Mode assumed for a file that had no previous permissions.
#[cfg(unix)]
const DEFAULT_MODE: u32 = 0o644;

/// Make `path` writable by its owner.
///
/// Returns the permissions it had before, or `None` when the file does not
/// exist yet.
pub(crate) fn lift(path: &Path) -> io::Result<Option<Permissions>> {
    let original = match fs::metadata(path) {
        Ok(metadata) => metadata.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    #[allow(unused_mut)]
    let mut writable = original.clone();
    #[cfg(unix)]
    writable.set_mode(original.mode() | 0o600);
    #[cfg(not(unix))]
    writable.set_readonly(false);

    fs::set_permissions(path, writable)?;
    Ok(Some(original))
}

/// Make `path` read-only, keeping the remaining bits of `original`.
///
/// Only write bits are removed. Read bits are never added, so a private
/// `0o600` file becomes `0o400` rather than readable by group and other.
/// A file with no previous permissions gets `0o444`.
pub(crate) fn protect(path: &Path, original: Option<&Permissions>) -> io::Result<()> {
    #[cfg(unix)]
    {
        let base = original.map(|p| p.mode()).unwrap_or(DEFAULT_MODE);
        fs::set_permissions(path, Permissions::from_mode(guarded_mode(base)))
    }
    #[cfg(not(unix))]
    {
        let _ = original;
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(path, permissions)
    }
}

/// Clear every write bit; the owner always keeps read access.
#[cfg(unix)]
fn guarded_mode(mode: u32) -> u32 {
    ((mode & 0o777) & !0o222) | 0o400
}
