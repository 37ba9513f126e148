//! Preflight checks for the external tools the pipeline shells out to.
use crate::error::PipelineError;

/// Tools that must resolve on `PATH` before anything is touched.
pub const REQUIRED_TOOLS: [&str; 2] = ["kubectl", "sops"];

/// Fail on the first tool in `tools` that `is_available` rejects.
pub fn check_required_tools<F>(tools: &[&str], mut is_available: F) -> Result<(), PipelineError>
where
    F: FnMut(&str) -> bool,
{
    for &tool in tools {
        if !is_available(tool) {
            return Err(PipelineError::MissingTool {
                tool: tool.to_string(),
            });
        }
        tracing::debug!(tool, "found required tool");
    }
    Ok(())
}

pub fn command_exists(tool: &str) -> bool {
    which::which(tool).is_ok()
}
