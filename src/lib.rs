// src/lib.rs

//! dylib-relocate
//!
//! Makes a set of macOS dylibs relocatable: each library, and every library
//! it transitively pulls in from a given prefix, is copied into one output
//! directory with its install name and its references to siblings rewritten
//! to `@rpath/<basename>`.
//!
//! # Architecture
//!
//! - [`report`]: parsing of `otool -L` output
//! - [`tools`]: `otool` / `install_name_tool` behind the [`Inspector`] and
//!   [`Mutator`] traits
//! - [`permissions`]: scoped write access for read-only files
//! - [`rewriter`]: install name changes under scoped write access
//! - [`relocate`]: the worklist driver that copies and rewrites until every
//!   in-prefix dependency is bundled

pub mod config;
mod error;
pub mod paths;
pub mod permissions;
pub mod relocate;
pub mod report;
pub mod rewriter;
pub mod tools;

pub use config::{ConfigFile, RelocateConfig, ToolPaths, default_output_dir};
pub use error::{Error, Result};
pub use relocate::{PendingRewrite, RelocationReport, Relocator};
pub use report::{LibraryMetadata, parse_library_report};
pub use rewriter::Rewriter;
pub use tools::{InstallNameTool, Inspector, Mutator, Otool, XcodeTools};
