// src/rewriter.rs

//! Install name rewriting with scoped write access

use crate::error::Result;
use crate::paths::rpath_name;
use crate::permissions::ensure_writable;
use crate::tools::Mutator;
use std::path::Path;

/// Applies install name changes through a [`Mutator`]
///
/// Every change runs under [`ensure_writable`], so read-only copies are
/// handled transparently and keep their original mode.
pub struct Rewriter<'a, M: Mutator + ?Sized> {
    mutator: &'a M,
}

impl<'a, M: Mutator + ?Sized> Rewriter<'a, M> {
    pub fn new(mutator: &'a M) -> Self {
        Self { mutator }
    }

    /// Set the install name of `path` to `@rpath/<basename of current_id>`
    pub fn set_self_identity(&self, path: &Path, current_id: &str) -> Result<String> {
        let new_id = rpath_name(current_id)?;
        ensure_writable(path, || self.mutator.set_id(path, &new_id))?;
        Ok(new_id)
    }

    /// Replace the reference `old` with `new` inside `path`
    pub fn rewrite_reference(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        ensure_writable(path, || self.mutator.change_reference(path, old, new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingMutator {
        calls: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Mutator for RecordingMutator {
        fn set_id(&self, path: &Path, id: &str) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("-id {} {}", id, path.display()));
            if self.fail {
                return Err(Error::ToolFailed {
                    command: "install_name_tool".to_string(),
                    code: "exit code 1".to_string(),
                    stderr: String::new(),
                });
            }
            Ok(())
        }

        fn change_reference(&self, path: &Path, old: &str, new: &str) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("-change {} {} {}", old, new, path.display()));
            Ok(())
        }
    }

    #[test]
    fn test_set_self_identity_uses_basename_of_id() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("libfoo.dylib");
        fs::write(&lib, "x").unwrap();

        let mutator = RecordingMutator::default();
        let new_id = Rewriter::new(&mutator)
            .set_self_identity(&lib, "/opt/homebrew/opt/foo/lib/libfoo.3.dylib")
            .unwrap();

        assert_eq!(new_id, "@rpath/libfoo.3.dylib");
        assert_eq!(
            mutator.calls.borrow().as_slice(),
            [format!("-id @rpath/libfoo.3.dylib {}", lib.display())]
        );
    }

    #[test]
    fn test_rewrite_reference_on_read_only_file() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("libfoo.dylib");
        fs::write(&lib, "x").unwrap();
        fs::set_permissions(&lib, fs::Permissions::from_mode(0o444)).unwrap();

        let mutator = RecordingMutator::default();
        Rewriter::new(&mutator)
            .rewrite_reference(&lib, "/usr/local/lib/libbar.dylib", "@rpath/libbar.dylib")
            .unwrap();

        assert_eq!(mutator.calls.borrow().len(), 1);
        let mode = fs::metadata(&lib).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o444);
    }

    #[test]
    fn test_mutator_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("libfoo.dylib");
        fs::write(&lib, "x").unwrap();
        fs::set_permissions(&lib, fs::Permissions::from_mode(0o444)).unwrap();

        let mutator = RecordingMutator {
            fail: true,
            ..Default::default()
        };
        let err = Rewriter::new(&mutator)
            .set_self_identity(&lib, "/usr/local/lib/libfoo.dylib")
            .unwrap_err();

        assert!(matches!(err, Error::ToolFailed { .. }));
        let mode = fs::metadata(&lib).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o444);
    }
}
