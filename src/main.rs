//! kube-env-sops: turn a `.env.local` file into a sops-encrypted Kubernetes
//! Secret manifest by chaining `kubectl kustomize` and `sops --encrypt`.
use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cleanup;
mod cli;
mod config;
mod error;
mod pipeline;
mod preflight;
mod process;
mod templates;
mod util;

use cli::RootArgs;
use pipeline::{run_pipeline, PipelineOutcome};
use preflight::{check_required_tools, command_exists, REQUIRED_TOOLS};
use process::SystemRunner;
use util::display_path;

const LOG_ENV: &str = "KUBE_ENV_SOPS_LOG";

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: RootArgs) -> Result<()> {
    check_required_tools(&REQUIRED_TOOLS, command_exists)?;

    let config = args.into_config()?;
    tracing::debug!(?config, "resolved configuration");

    let outcome = {
        let mut stdout = io::stdout().lock();
        run_pipeline(&config, &SystemRunner, &mut stdout)
    }
    .with_context(|| {
        format!(
            "generate encrypted secret in {}",
            config.working_dir.display()
        )
    })?;

    match outcome {
        PipelineOutcome::Persisted { path } => {
            let name = display_path(&path, Some(&config.working_dir));
            println!("Successfully created the encrypted secret: {name}");
        }
        PipelineOutcome::Emitted { bytes } => {
            tracing::debug!(bytes, "emitted encrypted secret to stdout");
        }
    }
    Ok(())
}
