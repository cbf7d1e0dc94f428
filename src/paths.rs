// src/paths.rs

//! Path helpers for install names and library copies
//!
//! Install names are plain strings inside a Mach-O file, so the helpers that
//! look at them work on `&str` and only switch to [`Path`] when the file
//! system is involved.

use crate::error::{Error, Result};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loader token resolved against a search path list
pub const RPATH_TOKEN: &str = "@rpath";

/// Loader token resolved against the loading binary's directory
pub const LOADER_PATH_TOKEN: &str = "@loader_path";

/// Last component of an install name or path string
///
/// Trailing slashes are ignored, so `/usr/lib/` yields `lib`.
pub fn basename(name: &str) -> Result<&str> {
    name.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|base| !base.is_empty())
        .ok_or_else(|| Error::InvalidPath(name.to_string()))
}

/// `@rpath/<basename>` for an install name
pub fn rpath_name(name: &str) -> Result<String> {
    Ok(format!("{}/{}", RPATH_TOKEN, basename(name)?))
}

/// Replace `@loader_path` in a reference with the directory it stands for
///
/// References that do not start with the token are returned unchanged.
pub fn substitute_loader_path(reference: &str, loader_path: &Path) -> String {
    if reference.starts_with(LOADER_PATH_TOKEN) {
        reference.replace(LOADER_PATH_TOKEN, &loader_path.to_string_lossy())
    } else {
        reference.to_string()
    }
}

/// Follow a symbolic link to its real target
///
/// Anything that is not a symlink (including paths that do not exist, such
/// as system libraries living in the shared cache) is returned as is.
pub fn resolve_symlink(path: &str) -> Result<String> {
    let is_symlink = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);

    if !is_symlink {
        return Ok(path.to_string());
    }

    let real = fs::canonicalize(path).map_err(Error::file(path))?;
    Ok(real.to_string_lossy().into_owned())
}

/// Directory containing `path`, used as the `@loader_path` context
pub fn loader_dir(path: &Path) -> Result<PathBuf> {
    path.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::InvalidPath(path.display().to_string()))
}

/// Copy a file keeping its permission bits and timestamps (`cp -p`)
pub fn copy_preserving(src: &Path, dest: &Path) -> Result<()> {
    info!("cp -p {} {}", src.display(), dest.display());

    // fs::copy carries the permission bits over
    fs::copy(src, dest).map_err(Error::file(src))?;

    let meta = fs::metadata(src).map_err(Error::file(src))?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
    .map_err(Error::file(dest))?;

    Ok(())
}
