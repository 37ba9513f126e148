//! Resolved run configuration and the artifact paths derived from it.
use std::path::{Path, PathBuf};

pub const KUSTOMIZATION_FILE_NAME: &str = "kustomization.yaml";
pub const ENV_SOURCE_FILE_NAME: &str = ".env.local";
pub const DECRYPTED_FILE_NAME: &str = ".env-dec.yml";
pub const DEFAULT_ENCRYPTED_FILE_NAME: &str = ".env-enc.yml";
/// Only the Secret payload fields are encrypted so metadata stays reviewable.
pub const DEFAULT_ENCRYPTED_REGEX: &str = "^(data|stringData)$";

/// Destination for the encrypted manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    File,
    Stdout,
}

/// Everything a single run needs, built once from the CLI.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub working_dir: PathBuf,
    pub encrypted_file_name: String,
    pub sink: Sink,
    pub allow_overwrite: bool,
    /// Field filter passed to `sops --encrypted-regex`; `None` encrypts every value.
    pub encrypted_regex: Option<String>,
}

impl PipelineConfig {
    /// Defaults for `working_dir`: file sink, no overwrite, payload-only encryption.
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            encrypted_file_name: DEFAULT_ENCRYPTED_FILE_NAME.to_string(),
            sink: Sink::File,
            allow_overwrite: false,
            encrypted_regex: Some(DEFAULT_ENCRYPTED_REGEX.to_string()),
        }
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(self.working_dir.clone(), &self.encrypted_file_name)
    }
}

/// The process working directory, or `./` when it cannot be read.
pub fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("./"))
}

/// Typed paths for every artifact the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    root: PathBuf,
    encrypted: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: PathBuf, encrypted_file_name: &str) -> Self {
        let encrypted = root.join(encrypted_file_name);
        Self { root, encrypted }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `kustomization.yaml` path.
    pub fn kustomization(&self) -> PathBuf {
        self.root.join(KUSTOMIZATION_FILE_NAME)
    }

    /// Return the `.env.local` path.
    pub fn env_source(&self) -> PathBuf {
        self.root.join(ENV_SOURCE_FILE_NAME)
    }

    /// Return the `.env-dec.yml` path.
    pub fn decrypted(&self) -> PathBuf {
        self.root.join(DECRYPTED_FILE_NAME)
    }

    pub fn encrypted(&self) -> &Path {
        &self.encrypted
    }
}
