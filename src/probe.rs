use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

/// Reports the version a Docker client binary declares for itself.
pub trait VersionProbe {
    fn probe(&self, binary: &Path) -> Result<String>;
}

/// Runs `docker -v` and parses the first line of its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerCliProbe;

impl VersionProbe for DockerCliProbe {
    fn probe(&self, binary: &Path) -> Result<String> {
        let output = Command::new(binary)
            .arg("-v")
            .output()
            .with_context(|| format!("Unable to run {}", binary.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!("{} -v output: {}", binary.display(), stdout.trim_end());

        parse_docker_version(&stdout).ok_or_else(|| anyhow!("Could not detect docker version."))
    }
}

/// `Docker version 1.10.0, build 590d510` -> `1.10.0`
pub fn parse_docker_version(output: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^Docker version (.*),").expect("static regex"));

    let first_line = output.lines().next()?;
    re.captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
