// src/permissions.rs

//! Scoped write access for read-only libraries
//!
//! Package managers commonly install dylibs as `0444`. The mutator needs to
//! write to them, so the file is made writable for the duration of a single
//! call and put back afterwards.

use crate::error::{Error, Result};
use nix::unistd::{AccessFlags, access};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Mode applied while a read-only file is being modified
const WRITABLE_MODE: u32 = 0o644;

/// Puts a saved mode back; dropping it while still armed restores too
struct RestoreMode {
    path: PathBuf,
    mode: u32,
    armed: bool,
}

impl RestoreMode {
    fn restore(&mut self) -> std::io::Result<()> {
        self.armed = false;
        debug!("Restoring mode {:o} on {}", self.mode, self.path.display());
        fs::set_permissions(&self.path, fs::Permissions::from_mode(self.mode))
    }
}

impl Drop for RestoreMode {
    // Only reached with `armed` set when the action panicked
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.restore() {
            warn!(
                "Failed to restore mode {:o} on {}: {}",
                self.mode,
                self.path.display(),
                e
            );
        }
    }
}

/// Whether the real user may write to `path`
pub fn is_writable(path: &Path) -> bool {
    access(path, AccessFlags::W_OK).is_ok()
}

/// Run `action` with `path` writable
///
/// If the file is already writable the action runs with no permission
/// change. Otherwise the current mode is saved, the file is set to `0644`,
/// and the saved mode is put back once the action returns, whether it
/// succeeded, failed, or panicked. A failed restore is an error; if the
/// action failed as well, the action's error is returned.
pub fn ensure_writable<T, F>(path: &Path, action: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    if is_writable(path) {
        return action();
    }

    let mode = fs::metadata(path)
        .map_err(Error::file(path))?
        .permissions()
        .mode()
        & 0o7777;
    debug!("Making {} writable (was {:o})", path.display(), mode);
    fs::set_permissions(path, fs::Permissions::from_mode(WRITABLE_MODE))
        .map_err(Error::file(path))?;

    let mut restore = RestoreMode {
        path: path.to_path_buf(),
        mode,
        armed: true,
    };
    let result = action();
    let restored = restore.restore();

    let value = result?;
    restored.map_err(Error::file(path))?;
    Ok(value)
}
