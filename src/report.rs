// src/report.rs

//! Parsing of `otool -L` library reports
//!
//! The inspector prints the file name on the first line, the library's own
//! install name on the second, and one referenced library per following
//! line:
//!
//! ```text
//! /opt/homebrew/lib/libfoo.dylib:
//! 	/opt/homebrew/opt/foo/lib/libfoo.1.dylib (compatibility version 2.0.0, current version 2.3.0)
//! 	/opt/homebrew/opt/bar/lib/libbar.dylib (compatibility version 1.0.0, current version 1.0.0)
//! 	/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1351.0.0)
//! ```
//!
//! Everything that knows about this text format lives here, so a change in
//! the tool's output only touches this module.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static OTOOL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\t(.*) \(compatibility version (?:\d+\.)*\d+, current version (?:\d+\.)*\d+\)",
    )
    .expect("otool pattern is a valid regex")
});

/// Identity and references of one library, as read at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMetadata {
    /// The install name the library embeds for itself
    pub id: String,
    /// Referenced libraries, in the order the inspector reported them
    pub dependencies: Vec<String>,
}

/// Extract the install name from one report line, if the line carries one
fn extract_install_name(line: &str) -> Option<&str> {
    OTOOL_RX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse raw inspector output into [`LibraryMetadata`]
///
/// `path` is only used for error messages. Lines after the identity that do
/// not look like a library reference (architecture headers and the like) are
/// skipped.
pub fn parse_library_report(path: &str, raw: &str) -> Result<LibraryMetadata> {
    let mut lines = raw.lines();

    // First line echoes the file name
    lines.next();

    let id_line = lines.next().ok_or_else(|| Error::MalformedReport {
        path: path.to_string(),
        reason: "missing install name line".to_string(),
    })?;

    let id = extract_install_name(id_line)
        .ok_or_else(|| Error::MalformedReport {
            path: path.to_string(),
            reason: format!("no install name in line: {}", id_line.trim()),
        })?
        .to_string();

    let dependencies = lines
        .filter_map(extract_install_name)
        .map(str::to_string)
        .collect();

    Ok(LibraryMetadata { id, dependencies })
}
