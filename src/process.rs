//! External tool execution.
//!
//! Orchestration talks to `kubectl` and `sops` only through [`ToolRunner`],
//! so the pipeline can be driven by a fake in tests.
use crate::error::PipelineError;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

pub trait ToolRunner {
    /// Run `program` with `args` from `cwd` and return its stdout verbatim.
    fn run(&self, cwd: &Path, program: &str, args: &[OsString]) -> Result<String, PipelineError>;
}

/// Runs tools as real child processes that inherit the caller's environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, cwd: &Path, program: &str, args: &[OsString]) -> Result<String, PipelineError> {
        run_tool(cwd, program, args)
    }
}

/// Spawn `program`, wait for it, and capture stdout and stderr separately.
///
/// On a non-zero exit or spawn failure the error detail is the status (or
/// spawn error) followed by the captured stderr, never the stdout.
pub fn run_tool(cwd: &Path, program: &str, args: &[OsString]) -> Result<String, PipelineError> {
    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| PipelineError::ToolFailed {
            tool: program.to_string(),
            detail: err.to_string(),
        })?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::info!(
        program,
        args = args.len(),
        elapsed_ms,
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "tool finished"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::ToolFailed {
            tool: program.to_string(),
            detail: format!("{}: {stderr}", output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
