//! CLI argument parsing.
//!
//! Flags are converted once into a [`PipelineConfig`]; nothing downstream
//! reads the parsed arguments directly.
use crate::config::{
    default_working_dir, PipelineConfig, Sink, DEFAULT_ENCRYPTED_FILE_NAME,
    DEFAULT_ENCRYPTED_REGEX,
};
use crate::error::PipelineError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "kube-env-sops",
    version,
    about = "Generate a sops-encrypted Kubernetes secret from a .env.local file",
    after_help = "Requires kubectl and sops on PATH.\n\nExamples:\n  kube-env-sops\n  kube-env-sops --cwd-path ./deploy/prod --force\n  kube-env-sops --save false > secret.enc.yml\n\nSet KUBE_ENV_SOPS_LOG (e.g. debug) to control log output on stderr."
)]
pub struct RootArgs {
    /// Directory holding .env.local and receiving the encrypted secret
    #[arg(long, value_name = "DIR", alias = "cwd_path")]
    pub cwd_path: Option<PathBuf>,

    /// File name of the encrypted secret, relative to --cwd-path
    #[arg(
        long,
        value_name = "NAME",
        alias = "dot_env_enc_file_name",
        default_value = DEFAULT_ENCRYPTED_FILE_NAME
    )]
    pub dot_env_enc_file_name: String,

    /// Write the encrypted secret to a file; set to false to print it to stdout
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub save: bool,

    /// Overwrite an existing encrypted secret
    #[arg(long)]
    pub force: bool,

    /// Keys matching this regex are encrypted by sops
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_ENCRYPTED_REGEX)]
    pub encrypted_regex: String,

    /// Encrypt every value instead of only data/stringData
    #[arg(long)]
    pub no_encrypted_regex: bool,

    /// Emit debug logs on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl RootArgs {
    /// Build the run configuration. The working directory is made absolute
    /// because tools run from inside it and also receive it as an argument.
    pub fn into_config(self) -> Result<PipelineConfig, PipelineError> {
        let requested = self.cwd_path.unwrap_or_else(default_working_dir);
        let working_dir = std::path::absolute(&requested)
            .map_err(|err| PipelineError::io("resolve working directory", requested, err))?;
        Ok(PipelineConfig {
            encrypted_file_name: self.dot_env_enc_file_name,
            sink: if self.save { Sink::File } else { Sink::Stdout },
            allow_overwrite: self.force,
            encrypted_regex: (!self.no_encrypted_regex).then_some(self.encrypted_regex),
            ..PipelineConfig::new(working_dir)
        })
    }
}
