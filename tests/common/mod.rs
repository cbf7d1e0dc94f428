// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! A "dylib" in these tests is a text file holding the `otool -L` report for
//! itself. [`FakeTools`] reads that report back and edits it in place the
//! way `install_name_tool` edits load commands, so the driver runs for real
//! against the file system without needing macOS.

#![allow(dead_code)]

use dylib_relocate::{Inspector, LibraryMetadata, Mutator, Result, parse_library_report};
use std::cell::RefCell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One report line for an install name
pub fn report_line(name: &str) -> String {
    format!(
        "\t{} (compatibility version 1.0.0, current version 1.0.0)",
        name
    )
}

/// Write a fake dylib whose report names `id` and `deps`
pub fn write_dylib(path: &Path, id: &str, deps: &[&str]) {
    let mut content = format!("{}:\n{}\n", path.display(), report_line(id));
    for dep in deps {
        content.push_str(&report_line(dep));
        content.push('\n');
    }
    write_raw(path, &content);
}

/// Write arbitrary content, creating parent directories
pub fn write_raw(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Read the report of a fake dylib
pub fn read_report(path: &Path) -> LibraryMetadata {
    let raw = fs::read_to_string(path).unwrap();
    parse_library_report(&path.to_string_lossy(), &raw).unwrap()
}

/// Permission bits of a file
pub fn mode_of(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

/// A recorded mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetId { path: PathBuf, id: String },
    Change { path: PathBuf, old: String, new: String },
}

/// In-process stand-in for `otool` and `install_name_tool`
#[derive(Default)]
pub struct FakeTools {
    pub calls: RefCell<Vec<Call>>,
    pub inspected: RefCell<Vec<PathBuf>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `-id` calls made against `path`
    pub fn set_id_count(&self, path: &Path) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::SetId { path: p, .. } if p == path))
            .count()
    }

    fn edit(path: &Path, from_line: usize, old: &str, new: &str) -> Result<()> {
        let raw = fs::read_to_string(path)?;
        let old_prefix = format!("\t{} (", old);
        let new_prefix = format!("\t{} (", new);

        let mut out = String::with_capacity(raw.len());
        for (index, line) in raw.lines().enumerate() {
            if index >= from_line && line.starts_with(&old_prefix) {
                out.push_str(&line.replacen(&old_prefix, &new_prefix, 1));
            } else {
                out.push_str(line);
            }
            out.push('\n');
        }

        // Plain write: fails on a read-only file unless the caller made it writable
        fs::write(path, out)?;
        Ok(())
    }
}

impl Inspector for FakeTools {
    fn inspect(&self, path: &Path) -> Result<LibraryMetadata> {
        self.inspected.borrow_mut().push(path.to_path_buf());
        let raw = fs::read_to_string(path)?;
        parse_library_report(&path.to_string_lossy(), &raw)
    }
}

impl Mutator for FakeTools {
    fn set_id(&self, path: &Path, id: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::SetId {
            path: path.to_path_buf(),
            id: id.to_string(),
        });
        // Identity lives on the second line only
        let raw = fs::read_to_string(path)?;
        let id_line = report_line(id);
        let mut lines: Vec<&str> = raw.lines().collect();
        lines[1] = &id_line;
        fs::write(path, lines.join("\n") + "\n")?;
        Ok(())
    }

    fn change_reference(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Change {
            path: path.to_path_buf(),
            old: old.to_string(),
            new: new.to_string(),
        });
        Self::edit(path, 2, old, new)
    }
}

/// Scratch layout: a prefix tree with source libraries and a separate bundle
pub struct Sandbox {
    _temp: TempDir,
    pub root: PathBuf,
    pub prefix: PathBuf,
    pub output_dir: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        // Canonical root so install names match realpath results (macOS /var -> /private/var)
        let root = temp.path().canonicalize().unwrap();
        let prefix = root.join("usr/local");
        let output_dir = root.join("bundle/macos/lib");
        fs::create_dir_all(&prefix).unwrap();
        Self {
            _temp: temp,
            root,
            prefix,
            output_dir,
        }
    }

    /// Prefix as the string the driver compares against
    pub fn prefix_str(&self) -> String {
        self.prefix.to_string_lossy().into_owned()
    }

    /// Absolute path under the prefix
    pub fn under_prefix(&self, rel: &str) -> PathBuf {
        self.prefix.join(rel)
    }

    /// Absolute path string under the prefix
    pub fn name(&self, rel: &str) -> String {
        self.under_prefix(rel).to_string_lossy().into_owned()
    }

    /// Path of a bundled copy
    pub fn bundled(&self, basename: &str) -> PathBuf {
        self.output_dir.join(basename)
    }

    /// Sorted file names in the output directory
    pub fn bundle_contents(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.output_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
