//! Filesystem primitives shared by the pipeline stages.
use crate::error::PipelineError;
use std::fs;
use std::path::Path;

/// Report whether anything is reachable at `path`.
///
/// Any error from `metadata` (missing entry, permission denied, broken
/// symlink) is treated as "does not exist".
pub fn path_exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Create or truncate `path` and write `contents` in full.
pub fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    fs::write(path, contents.as_bytes()).map_err(|err| PipelineError::io("write", path, err))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Best-effort removal; the file may already be gone.
pub fn remove_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed file"),
        Err(err) => tracing::debug!(path = %path.display(), %err, "skipped removal"),
    }
}

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
