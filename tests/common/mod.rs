//! Shared test infrastructure for integration tests.
//!
//! Each fixture gets its own working directory and a private `bin/` holding
//! stub `kubectl` and `sops` scripts, which is placed first on `PATH` for the
//! binary under test.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Manifest printed by the stub `kubectl kustomize`.
pub const STUB_MANIFEST: &str =
    "apiVersion: v1\nkind: Secret\nmetadata:\n  name: environment-secrets\ndata:\n  TOKEN: c2VjcmV0\n";

/// What the stub `sops` prints: a marker line followed by the staged manifest.
pub fn stub_encrypted() -> String {
    format!("sops-stub-encrypted\n{STUB_MANIFEST}")
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()))
}

pub struct TestFixture {
    temp: TempDir,
    isolated_path: bool,
    envs: Vec<(String, String)>,
}

impl TestFixture {
    /// Fixture with both stub tools installed.
    pub fn new() -> Self {
        Self::with_tools(&["kubectl", "sops"])
    }

    pub fn with_tools(tools: &[&str]) -> Self {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join("work")).expect("create work dir");
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).expect("create bin dir");
        for tool in tools {
            let dest = bin.join(tool);
            fs::copy(manifest_dir().join("tests/stubs").join(tool), &dest)
                .expect("install stub tool");
            fs::set_permissions(&dest, fs::Permissions::from_mode(0o755))
                .expect("make stub executable");
        }
        Self {
            temp,
            isolated_path: false,
            envs: Vec::new(),
        }
    }

    /// Set an environment variable for the binary (and the stubs it spawns).
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.work_dir().join(name), contents).expect("write fixture file");
    }

    pub fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.work_dir().join(name)).ok()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.work_dir().join(name).exists()
    }

    fn stub_log(&self) -> PathBuf {
        self.temp.path().join("stub-calls.log")
    }

    /// Lines of `<tool> <args...>` recorded by the stubs, in call order.
    pub fn tool_calls(&self) -> Vec<String> {
        fs::read_to_string(self.stub_log())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Put only the stub dir on `PATH`, hiding any system-wide tools.
    pub fn isolated_path(mut self) -> Self {
        self.isolated_path = true;
        self
    }

    /// Run the binary against the fixture's work dir with extra `args`.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run kube-env-sops")
    }

    /// Run with `--cwd-path` omitted, from inside the work dir.
    pub fn run_in_work_dir(&self, args: &[&str]) -> Output {
        let mut command = self.base_command();
        command.args(args).current_dir(self.work_dir());
        command.output().expect("run kube-env-sops")
    }

    /// Run from the directory that contains the work dir, passing only `args`.
    pub fn run_from_parent(&self, args: &[&str]) -> Output {
        let mut command = self.base_command();
        command.args(args).current_dir(self.temp.path());
        command.output().expect("run kube-env-sops")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = self.base_command();
        command.arg("--cwd-path").arg(self.work_dir()).args(args);
        command
    }

    fn base_command(&self) -> Command {
        let bin = self.temp.path().join("bin");
        let path = if self.isolated_path {
            bin.display().to_string()
        } else {
            stub_path(&bin)
        };
        let mut command = Command::new(env!("CARGO_BIN_EXE_kube-env-sops"));
        command
            .env("PATH", path)
            .env("STUB_LOG", self.stub_log())
            .env_remove("KUBE_ENV_SOPS_LOG");
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }
}

/// Stub dir first, then the system dirs the stub scripts need for `cat`.
fn stub_path(bin: &Path) -> String {
    format!("{}:/usr/bin:/bin", bin.display())
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
