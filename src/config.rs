use crate::types::ShellFormat;
use crate::cli::Cli;
use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "dvm";
pub const DEFAULT_DIR_NAME: &str = ".dvm";
pub const BIN_DIR_NAME: &str = "bin";
pub const DOCKER_DIR_NAME: &str = "docker";
pub const ALIAS_DIR_NAME: &str = "alias";
pub const TMP_DIR_NAME: &str = ".tmp";
pub const OUTPUT_SCRIPT_STEM: &str = "dvm-output";

pub const DOCKER_REPO: &str = "docker/docker";
pub const DVM_REPO: &str = "getcarina/dvm";
pub const DOCKER_MIRROR_URL: &str = "https://get.docker.com/builds";
pub const EXPERIMENTAL_MIRROR_URL: &str = "https://experimental.docker.com/builds";
pub const DVM_RELEASE_URL: &str = "https://download.getcarina.com/dvm";

pub const DOCKER_VERSION_ENV: &str = "DOCKER_VERSION";

/// Per-invocation settings. Built once from flags and environment, then only
/// borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub dvm_dir: PathBuf,
    pub shell: ShellFormat,
    pub github_token: Option<String>,
    pub docker_version: Option<String>,
    pub debug: bool,
    pub silent: bool,
    /// PATH entries of the invoking process, in order
    pub path: Vec<PathBuf>,
}

impl Config {
    /// Config rooted at `dvm_dir` with no environment applied.
    pub fn new(dvm_dir: impl Into<PathBuf>) -> Self {
        Self {
            dvm_dir: dvm_dir.into(),
            shell: ShellFormat::default(),
            github_token: None,
            docker_version: None,
            debug: false,
            silent: false,
            path: Vec::new(),
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let dvm_dir = match flag_or_env(cli.dvm_dir.as_deref(), "DVM_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_dvm_dir()?,
        };

        let shell = flag_or_env(cli.shell.as_deref(), "SHELL")
            .map(|s| ShellFormat::parse(&s))
            .unwrap_or_default();

        let silent = cli.silent
            || env::var("DVM_SILENT")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false);

        let path = env::var_os("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();

        Ok(Self {
            shell,
            github_token: flag_or_env(cli.github_token.as_deref(), "GITHUB_TOKEN"),
            docker_version: flag_or_env(None, DOCKER_VERSION_ENV),
            debug: cli.debug,
            silent,
            path,
            ..Self::new(dvm_dir)
        })
    }

    /// Root of the managed installs, `<dvm_dir>/bin/docker`.
    pub fn bin_root(&self) -> PathBuf {
        self.dvm_dir.join(BIN_DIR_NAME).join(DOCKER_DIR_NAME)
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.bin_root().join(version)
    }

    pub fn alias_dir(&self) -> PathBuf {
        self.dvm_dir.join(ALIAS_DIR_NAME)
    }

    pub fn output_script_path(&self) -> PathBuf {
        self.dvm_dir.join(TMP_DIR_NAME).join(format!(
            "{}.{}",
            OUTPUT_SCRIPT_STEM,
            self.shell.script_extension()
        ))
    }
}

/// Trimmed flag value, falling back to the environment. Empty counts as unset.
fn flag_or_env(flag: Option<&str>, var: &str) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| env::var(var).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_dvm_dir() -> Result<PathBuf> {
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .ok_or_else(|| anyhow!("Unable to determine {} home directory", APP_NAME))
}
