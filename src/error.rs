// src/error.rs

//! Error types for dylib relocation

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while relocating libraries
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while copying or inspecting files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required external tool could not be located
    #[error("Tool not found: {tool} (is it installed and on PATH?)")]
    ToolNotFound { tool: String },

    /// An external tool exited with a non-zero status
    #[error("Command failed ({code}): {command}\n{stderr}")]
    ToolFailed {
        command: String,
        code: String,
        stderr: String,
    },

    /// Inspector output could not be parsed
    #[error("Malformed library report for '{path}': {reason}")]
    MalformedReport { path: String, reason: String },

    /// Path has no usable file name or parent
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach the offending path to an I/O error
    pub fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::File { path, source }
    }
}

/// Result type for relocation operations
pub type Result<T> = std::result::Result<T, Error>;
