// src/tools.rs

//! External Mach-O tools
//!
//! Reading and rewriting load commands is delegated to Apple's command line
//! tools:
//!
//! - `otool -L <path>` reports the install name and referenced libraries
//! - `install_name_tool -id <name> <path>` sets the install name
//! - `install_name_tool -change <old> <new> <path>` rewrites one reference
//!
//! The [`Inspector`] and [`Mutator`] traits are the seams the relocation
//! driver works against, so it can run without the real tools.

use crate::error::{Error, Result};
use crate::report::{LibraryMetadata, parse_library_report};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Reads a library's install name and references
pub trait Inspector {
    /// Inspect the library at `path`; never cached, files change between calls
    fn inspect(&self, path: &Path) -> Result<LibraryMetadata>;
}

/// Rewrites install names inside a library in place
pub trait Mutator {
    /// Set the library's own install name
    fn set_id(&self, path: &Path, id: &str) -> Result<()>;

    /// Replace one referenced install name
    fn change_reference(&self, path: &Path, old: &str, new: &str) -> Result<()>;
}

/// Locate `tool`, preferring an explicit path
pub fn locate_tool(tool: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    which::which(tool).map_err(|_| Error::ToolNotFound {
        tool: tool.to_string(),
    })
}

/// Render a command the way a shell user would type it
fn display_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("'{}'", arg)
            } else {
                arg.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion, turning a non-zero exit into an error
fn run_tool(cmd: &mut Command) -> Result<Output> {
    let shown = display_command(cmd);
    info!("{}", shown);

    let output = cmd.output().map_err(|e| Error::ToolFailed {
        command: shown.clone(),
        code: "spawn".to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| format!("exit code {}", c))
            .unwrap_or_else(|| "terminated by signal".to_string());
        return Err(Error::ToolFailed {
            command: shown,
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// `otool -L` backed [`Inspector`]
#[derive(Debug, Clone)]
pub struct Otool {
    program: PathBuf,
}

impl Otool {
    /// Use the `otool` binary at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `otool`, unless an explicit path is given
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        locate_tool("otool", explicit).map(Self::new)
    }
}

impl Inspector for Otool {
    fn inspect(&self, path: &Path) -> Result<LibraryMetadata> {
        let output = run_tool(Command::new(&self.program).arg("-L").arg(path))?;
        let raw = String::from_utf8_lossy(&output.stdout);
        let meta = parse_library_report(&path.to_string_lossy(), &raw)?;
        debug!(
            "{}: id {} with {} references",
            path.display(),
            meta.id,
            meta.dependencies.len()
        );
        Ok(meta)
    }
}

/// `install_name_tool` backed [`Mutator`]
#[derive(Debug, Clone)]
pub struct InstallNameTool {
    program: PathBuf,
}

impl InstallNameTool {
    /// Use the `install_name_tool` binary at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `install_name_tool`, unless an explicit path is given
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        locate_tool("install_name_tool", explicit).map(Self::new)
    }
}

impl Mutator for InstallNameTool {
    fn set_id(&self, path: &Path, id: &str) -> Result<()> {
        run_tool(Command::new(&self.program).arg("-id").arg(id).arg(path))?;
        Ok(())
    }

    fn change_reference(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        run_tool(
            Command::new(&self.program)
                .arg("-change")
                .arg(old)
                .arg(new)
                .arg(path),
        )?;
        Ok(())
    }
}

/// The pair of Xcode command line tools used for a real run
#[derive(Debug, Clone)]
pub struct XcodeTools {
    pub otool: Otool,
    pub install_name_tool: InstallNameTool,
}

impl XcodeTools {
    /// Locate both tools, honouring explicit paths
    pub fn locate(otool: Option<&Path>, install_name_tool: Option<&Path>) -> Result<Self> {
        Ok(Self {
            otool: Otool::locate(otool)?,
            install_name_tool: InstallNameTool::locate(install_name_tool)?,
        })
    }
}

impl Inspector for XcodeTools {
    fn inspect(&self, path: &Path) -> Result<LibraryMetadata> {
        self.otool.inspect(path)
    }
}

impl Mutator for XcodeTools {
    fn set_id(&self, path: &Path, id: &str) -> Result<()> {
        self.install_name_tool.set_id(path, id)
    }

    fn change_reference(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        self.install_name_tool.change_reference(path, old, new)
    }
}
