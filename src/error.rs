//! Error taxonomy for the secret pipeline.
//!
//! Every failure is fatal to the run. Helpers return these values instead of
//! exiting so `main` stays the single place that terminates the process.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required external tool does not resolve on `PATH`.
    #[error("{tool} is required. Please install.")]
    MissingTool { tool: String },

    /// Neither a kustomization config nor the env source exists.
    #[error("a {env_file} does not exist in {dir}. Please create a {env_file} file.")]
    MissingEnvSource { env_file: String, dir: PathBuf },

    /// The encrypted output exists and overwriting was not allowed.
    #[error("{name} exists. Set the --force flag if you would like to overwrite.")]
    OutputExists { name: String },

    /// The output name escapes the working directory or names a file the
    /// pipeline itself reads, writes, or removes.
    #[error("invalid --dot-env-enc-file-name {name:?}: {reason}")]
    InvalidOutputName { name: String, reason: String },

    #[error("invalid --encrypted-regex {pattern:?}")]
    InvalidEncryptedRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{action} {path}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool exited non-zero or could not be spawned; `detail` carries
    /// the status and captured stderr.
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    /// Writing the encrypted text to the stream sink failed.
    #[error("write encrypted secret to stdout")]
    Emit(#[source] io::Error),
}

impl PipelineError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
