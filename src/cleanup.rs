//! Scoped removal of transient pipeline artifacts.
use crate::util::remove_file;
use std::path::{Path, PathBuf};

/// Paths scheduled for removal when the run ends.
///
/// Paths are removed in reverse registration order, once, either by
/// [`CleanupScope::release`] or when the scope is dropped on an early return.
#[derive(Debug, Default)]
pub struct CleanupScope {
    paths: Vec<PathBuf>,
}

impl CleanupScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &Path) {
        tracing::debug!(path = %path.display(), "scheduled for cleanup");
        self.paths.push(path.to_path_buf());
    }

    /// Remove every registered path and return them in removal order.
    pub fn release(&mut self) -> Vec<PathBuf> {
        let mut released = Vec::with_capacity(self.paths.len());
        while let Some(path) = self.paths.pop() {
            remove_file(&path);
            released.push(path);
        }
        released
    }
}

impl Drop for CleanupScope {
    fn drop(&mut self) {
        self.release();
    }
}
