//! The staged secret pipeline.
//!
//! Guards run first and decide whether the run may proceed at all. Once they
//! pass, every transient artifact is registered with a [`CleanupScope`] before
//! it is written, so the intermediate plaintext manifest and any config this
//! run created are removed on every return path.
use crate::cleanup::CleanupScope;
use crate::config::{
    ArtifactPaths, PipelineConfig, Sink, DECRYPTED_FILE_NAME, ENV_SOURCE_FILE_NAME,
    KUSTOMIZATION_FILE_NAME,
};
use crate::error::PipelineError;
use crate::process::ToolRunner;
use crate::templates::render_kustomization;
use crate::util::{path_exists, write_file};
use regex::Regex;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

pub const GENERATOR_TOOL: &str = "kubectl";
pub const ENCRYPTION_TOOL: &str = "sops";

/// How a successful run delivered the encrypted manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Persisted { path: PathBuf },
    Emitted { bytes: usize },
}

/// Result of guard evaluation for a run that may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardDecision {
    /// No kustomization existed beforehand; this run writes it and must remove it.
    pub owns_config: bool,
}

/// Decide whether the run may proceed. Reads metadata only; writes nothing.
pub fn evaluate_guards(
    config: &PipelineConfig,
    paths: &ArtifactPaths,
) -> Result<GuardDecision, PipelineError> {
    if config.sink == Sink::File {
        check_output_name(&config.encrypted_file_name, paths)?;
    }

    // An existing kustomization is trusted to reference its own env source.
    let config_exists = path_exists(&paths.kustomization());
    if !config_exists && !path_exists(&paths.env_source()) {
        return Err(PipelineError::MissingEnvSource {
            env_file: ENV_SOURCE_FILE_NAME.to_string(),
            dir: paths.root().to_path_buf(),
        });
    }

    if config.sink == Sink::File && path_exists(paths.encrypted()) && !config.allow_overwrite {
        return Err(PipelineError::OutputExists {
            name: config.encrypted_file_name.clone(),
        });
    }

    if let Some(pattern) = config.encrypted_regex.as_deref() {
        Regex::new(pattern).map_err(|source| PipelineError::InvalidEncryptedRegex {
            pattern: pattern.to_string(),
            source,
        })?;
    }

    Ok(GuardDecision {
        owns_config: !config_exists,
    })
}

/// Reject output names that leave the working directory or collide with the
/// kustomization, the env source, or the staged plaintext manifest.
fn check_output_name(name: &str, paths: &ArtifactPaths) -> Result<(), PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidOutputName {
        name: name.to_string(),
        reason,
    };
    let relative = Path::new(name);
    if relative.has_root() || relative.is_absolute() {
        return Err(invalid("must be relative to the working directory".to_string()));
    }
    if relative.file_name().is_none() {
        return Err(invalid("does not name a file".to_string()));
    }
    if relative
        .components()
        .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid("must stay inside the working directory".to_string()));
    }

    let reserved = [
        (paths.kustomization(), KUSTOMIZATION_FILE_NAME),
        (paths.env_source(), ENV_SOURCE_FILE_NAME),
        (paths.decrypted(), DECRYPTED_FILE_NAME),
    ];
    for (path, file_name) in reserved {
        if paths.encrypted() == path {
            return Err(invalid(format!("{file_name} is used by the pipeline itself")));
        }
    }
    Ok(())
}

/// Run every stage after preflight: guards, config, generate, stage, encrypt, sink.
///
/// `stdout` receives the encrypted manifest when the sink is [`Sink::Stdout`].
pub fn run_pipeline<R, W>(
    config: &PipelineConfig,
    runner: &R,
    stdout: &mut W,
) -> Result<PipelineOutcome, PipelineError>
where
    R: ToolRunner + ?Sized,
    W: Write + ?Sized,
{
    let paths = config.paths();
    let decision = evaluate_guards(config, &paths)?;
    tracing::debug!(
        root = %paths.root().display(),
        owns_config = decision.owns_config,
        sink = ?config.sink,
        "guards passed"
    );

    let mut cleanup = CleanupScope::new();
    if decision.owns_config {
        cleanup.register(&paths.kustomization());
    }
    cleanup.register(&paths.decrypted());

    let result = run_stages(config, &paths, decision, runner, stdout);

    let removed = cleanup.release();
    tracing::debug!(removed = removed.len(), "cleanup complete");
    result
}

fn run_stages<R, W>(
    config: &PipelineConfig,
    paths: &ArtifactPaths,
    decision: GuardDecision,
    runner: &R,
    stdout: &mut W,
) -> Result<PipelineOutcome, PipelineError>
where
    R: ToolRunner + ?Sized,
    W: Write + ?Sized,
{
    if decision.owns_config {
        write_file(
            &paths.kustomization(),
            &render_kustomization(ENV_SOURCE_FILE_NAME),
        )?;
    }

    let manifest = runner.run(paths.root(), GENERATOR_TOOL, &kustomize_args(paths.root()))?;

    let decrypted = paths.decrypted();
    write_file(&decrypted, &manifest)?;

    let encrypted = runner.run(
        paths.root(),
        ENCRYPTION_TOOL,
        &sops_encrypt_args(config.encrypted_regex.as_deref(), &decrypted),
    )?;

    match config.sink {
        Sink::Stdout => {
            stdout
                .write_all(encrypted.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(PipelineError::Emit)?;
            Ok(PipelineOutcome::Emitted {
                bytes: encrypted.len(),
            })
        }
        Sink::File => {
            let path = paths.encrypted().to_path_buf();
            write_file(&path, &encrypted)?;
            tracing::info!(path = %path.display(), "persisted encrypted secret");
            Ok(PipelineOutcome::Persisted { path })
        }
    }
}

/// Arguments for `kubectl kustomize <root>`.
pub fn kustomize_args(root: &Path) -> Vec<OsString> {
    vec![OsString::from("kustomize"), root.as_os_str().to_owned()]
}

/// Arguments for `sops --encrypt [--encrypted-regex <re>] <path>`.
pub fn sops_encrypt_args(encrypted_regex: Option<&str>, decrypted: &Path) -> Vec<OsString> {
    let mut args = vec![OsString::from("--encrypt")];
    if let Some(pattern) = encrypted_regex {
        args.push(OsString::from("--encrypted-regex"));
        args.push(OsString::from(pattern));
    }
    args.push(decrypted.as_os_str().to_owned());
    args
}
