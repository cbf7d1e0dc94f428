// src/config.rs

//! Relocation configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then the
//! command line, each layer overriding the previous one:
//!
//! ```toml
//! output_dir = "packaging/macos/lib"
//!
//! [tools]
//! otool = "/Library/Developer/CommandLineTools/usr/bin/otool"
//! install_name_tool = "/Library/Developer/CommandLineTools/usr/bin/install_name_tool"
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Explicit tool locations; unset tools are looked up on `PATH`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    pub otool: Option<PathBuf>,
    pub install_name_tool: Option<PathBuf>,
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub output_dir: Option<PathBuf>,
    pub tools: ToolPaths,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Settings for one relocation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocateConfig {
    /// Resolved dependencies starting with this string are copied and rewritten
    pub prefix: String,

    /// Destination for library copies; wiped at the start of every run
    pub output_dir: PathBuf,

    /// Explicit tool locations
    pub tools: ToolPaths,
}

impl RelocateConfig {
    /// Create a config writing into `output_dir`
    pub fn new(prefix: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            output_dir: output_dir.into(),
            tools: ToolPaths::default(),
        }
    }

    /// Build a config from a configuration file and command-line overrides
    ///
    /// `default_dir` is only called when neither the flag nor the file names
    /// an output directory.
    pub fn layered<F>(
        prefix: impl Into<String>,
        file: ConfigFile,
        output_dir: Option<PathBuf>,
        default_dir: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> Result<PathBuf>,
    {
        let output_dir = match output_dir.or(file.output_dir) {
            Some(dir) => dir,
            None => default_dir()?,
        };
        Ok(Self::new(prefix, output_dir).with_tools(file.tools))
    }

    /// Apply tool locations from a configuration file
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        if let Some(otool) = tools.otool {
            self.tools.otool = Some(otool);
        }
        if let Some(tool) = tools.install_name_tool {
            self.tools.install_name_tool = Some(tool);
        }
        self
    }

    /// Use a specific `otool` binary
    pub fn with_otool(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools.otool = Some(path.into());
        self
    }

    /// Use a specific `install_name_tool` binary
    pub fn with_install_name_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools.install_name_tool = Some(path.into());
        self
    }

    /// Whether a resolved dependency path belongs to the bundle
    pub fn in_scope(&self, resolved: &str) -> bool {
        resolved.starts_with(&self.prefix)
    }
}

/// `macos/lib` next to the directory holding the running executable
///
/// A binary in `packaging/bin/` writes to `packaging/macos/lib/`.
pub fn default_output_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    output_dir_for(&exe)
}

fn output_dir_for(exe: &Path) -> Result<PathBuf> {
    let project = exe
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| Error::InvalidPath(exe.display().to_string()))?;
    Ok(project.join("macos").join("lib"))
}
