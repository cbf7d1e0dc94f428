// src/relocate.rs

//! Transitive relocation of a set of libraries
//!
//! The driver copies each requested library into the output directory under
//! the basename of its install name, then works through a stack of copies:
//!
//! 1. the copy's own install name becomes `@rpath/<basename>`
//! 2. every reference that resolves under the prefix becomes
//!    `@rpath/<basename>`
//! 3. a referenced library not yet present in the output directory is
//!    copied there and pushed onto the stack
//!
//! `@loader_path` in a reference is resolved against the directory of the
//! file the copy was made *from*, never the copy itself. References outside
//! the prefix (system libraries) are left alone.
//!
//! The output directory doubles as the seen-set: one basename, one copy.

use crate::config::RelocateConfig;
use crate::error::{Error, Result};
use crate::paths::{
    basename, copy_preserving, loader_dir, resolve_symlink, rpath_name, substitute_loader_path,
};
use crate::rewriter::Rewriter;
use crate::tools::{Inspector, Mutator};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A copied library waiting to have its install names rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRewrite {
    /// The copy inside the output directory
    pub dest: PathBuf,
    /// Where the copy came from; `@loader_path` resolves against its parent
    pub src: PathBuf,
}

/// Outcome of a relocation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Number of in-scope references rewritten to `@rpath`
    pub fix_count: usize,
    /// Every library copied into the output directory, in copy order
    pub libraries: Vec<PathBuf>,
}

/// Drives the copy-and-rewrite closure over a set of libraries
pub struct Relocator<'a, T: Inspector + Mutator + ?Sized> {
    config: &'a RelocateConfig,
    tools: &'a T,
}

impl<'a, T: Inspector + Mutator + ?Sized> Relocator<'a, T> {
    pub fn new(config: &'a RelocateConfig, tools: &'a T) -> Self {
        Self { config, tools }
    }

    /// Relocate `libraries` and everything they pull in from the prefix
    ///
    /// The output directory is removed and recreated first. Any tool failure
    /// stops the run; rerunning starts from a clean output directory.
    pub fn run(&self, libraries: &[PathBuf]) -> Result<RelocationReport> {
        self.prepare_output_dir()?;

        let mut report = RelocationReport::default();
        let mut worklist = self.seed(libraries, &mut report)?;

        while let Some(pending) = worklist.pop() {
            self.process(&pending, &mut worklist, &mut report)?;
        }

        info!(
            "Relocated {} libraries, rewrote {} references",
            report.libraries.len(),
            report.fix_count
        );
        Ok(report)
    }

    /// Remove and recreate the output directory
    pub fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if fs::symlink_metadata(dir).is_ok() {
            info!("rm -rf {}", dir.display());
            fs::remove_dir_all(dir).map_err(Error::file(dir))?;
        }
        info!("mkdir {}", dir.display());
        fs::create_dir_all(dir).map_err(Error::file(dir))?;
        Ok(())
    }

    /// Copy the requested libraries, named after their install names
    fn seed(
        &self,
        libraries: &[PathBuf],
        report: &mut RelocationReport,
    ) -> Result<Vec<PendingRewrite>> {
        let mut worklist = Vec::with_capacity(libraries.len());

        for library in libraries {
            let src = fs::canonicalize(library).map_err(Error::file(library))?;
            let meta = self.tools.inspect(&src)?;
            let dest = self.config.output_dir.join(basename(&meta.id)?);

            if dest.exists() {
                warn!(
                    "Skipping {}: {} is already in the bundle",
                    src.display(),
                    dest.display()
                );
                continue;
            }

            copy_preserving(&src, &dest)?;
            report.libraries.push(dest.clone());
            worklist.push(PendingRewrite { dest, src });
        }

        Ok(worklist)
    }

    /// Rewrite one copy and queue the in-scope libraries it references
    fn process(
        &self,
        pending: &PendingRewrite,
        worklist: &mut Vec<PendingRewrite>,
        report: &mut RelocationReport,
    ) -> Result<()> {
        let rewriter = Rewriter::new(self.tools);
        let loader_path = loader_dir(&pending.src)?;
        info!("loader_path: {}", loader_path.display());
        info!("=== Fix dependencies for {} ===", pending.dest.display());

        let meta = self.tools.inspect(&pending.dest)?;
        rewriter.set_self_identity(&pending.dest, &meta.id)?;

        for reference in &meta.dependencies {
            let resolved = resolve_symlink(&substitute_loader_path(reference, &loader_path))?;

            if !self.config.in_scope(&resolved) {
                debug!("Leaving {} as is", reference);
                continue;
            }

            report.fix_count += 1;
            let name = basename(&resolved)?;
            rewriter.rewrite_reference(&pending.dest, reference, &rpath_name(name)?)?;

            let dest = self.config.output_dir.join(name);
            if !dest.exists() {
                let src = PathBuf::from(&resolved);
                copy_preserving(&src, &dest)?;
                report.libraries.push(dest.clone());
                worklist.push(PendingRewrite { dest, src });
            }
        }

        Ok(())
    }
}
