// src/cli.rs
//! CLI definitions for dylib-relocate
//!
//! Positional arguments are optional at the clap level so that a short
//! invocation prints the full usage text with examples instead of clap's
//! one-line error.

use clap::Parser;
use std::path::PathBuf;

/// Example invocations shown with the usage text
pub const EXAMPLES: &str = "\
If you're using Homebrew, your invocation might look like this:
  $ dylib-relocate \"$(brew --prefix)\" \"$(brew --prefix mpv-iina)/lib/libmpv.dylib\"

If you're using MacPorts, your invocation might look like this:
  $ port contents mpv | grep '\\.dylib$' | xargs dylib-relocate /opt/local";

#[derive(Parser, Debug)]
#[command(name = "dylib-relocate")]
#[command(author = "dylib-relocate Contributors")]
#[command(version)]
#[command(
    about = "Copy dylibs and their dependencies under a prefix into a relocatable @rpath bundle",
    long_about = None
)]
#[command(override_usage = "dylib-relocate [OPTIONS] <PREFIX> <LIBRARIES>...")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Dependencies whose real path starts with this prefix are bundled
    #[arg(value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Libraries to relocate
    #[arg(value_name = "LIBRARIES")]
    pub libraries: Vec<PathBuf>,

    /// Output directory (default: macos/lib one level above the executable's directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to otool (default: looked up on PATH)
    #[arg(long, value_name = "PATH")]
    pub otool: Option<PathBuf>,

    /// Path to install_name_tool (default: looked up on PATH)
    #[arg(long, value_name = "PATH")]
    pub install_name_tool: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Prefix and libraries, if enough positional arguments were given
    pub fn positional(&self) -> Option<(&str, &[PathBuf])> {
        match (self.prefix.as_deref(), self.libraries.as_slice()) {
            (Some(prefix), libraries) if !libraries.is_empty() => Some((prefix, libraries)),
            _ => None,
        }
    }
}
