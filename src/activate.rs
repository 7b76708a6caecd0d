//! PATH activation.
//!
//! dvm never changes the caller's environment directly. It computes the new
//! PATH from the one it was started with and writes an assignment script in the
//! caller's shell dialect; the shell wrapper sources that script afterwards.

use crate::config::Config;
use crate::error::DvmError;
use crate::platform::get_system_info;
use crate::probe::VersionProbe;
use crate::types::ShellFormat;
use crate::version_ref::{EXPERIMENTAL, SYSTEM};
use anyhow::{Context, Result};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a PATH entry lies under the managed bin root. Compares path
/// components, so separators and trailing slashes do not matter.
pub fn is_managed(entry: &Path, bin_root: &Path) -> bool {
    entry.starts_with(bin_root)
}

/// Drop every managed entry, keeping the others in their original order.
pub fn remove_previous(entries: &[PathBuf], bin_root: &Path) -> Vec<PathBuf> {
    entries
        .iter()
        .filter(|entry| !is_managed(entry, bin_root))
        .cloned()
        .collect()
}

pub fn prepend(mut entries: Vec<PathBuf>, dir: PathBuf) -> Vec<PathBuf> {
    entries.insert(0, dir);
    entries
}

fn join_entries(entries: &[PathBuf]) -> Result<OsString> {
    env::join_paths(entries).context("PATH entry contains the path separator")
}

/// PATH assignment in the given dialect.
pub fn render_script(shell: ShellFormat, entries: &[PathBuf]) -> Result<String> {
    let path = join_entries(entries)?.to_string_lossy().to_string();

    Ok(match shell {
        ShellFormat::Sh => format!("export PATH=\"{}\"\n", escape_double_quoted(&path)),
        ShellFormat::PowerShell => format!("$env:PATH='{}'\r\n", path.replace('\'', "''")),
        ShellFormat::Cmd => format!("SET PATH={}\r\n", path),
    })
}

fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Computes PATH changes from the invocation's PATH and inspects which Docker
/// client is currently resolvable.
pub struct PathActivator<'a> {
    config: &'a Config,
    binary_name: String,
}

impl<'a> PathActivator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            binary_name: get_system_info().docker_binary_name(),
        }
    }

    /// The invocation's PATH without any managed entries.
    pub fn unmanaged_path(&self) -> Vec<PathBuf> {
        remove_previous(&self.config.path, &self.config.bin_root())
    }

    /// Put `version` first on PATH and emit the script.
    pub fn use_version(&self, version: &str) -> Result<Vec<PathBuf>, DvmError> {
        let entries = prepend(self.unmanaged_path(), self.config.version_dir(version));
        self.emit(&entries)?;
        Ok(entries)
    }

    /// Remove every managed entry and emit the script.
    pub fn deactivate(&self) -> Result<Vec<PathBuf>, DvmError> {
        let entries = self.unmanaged_path();
        self.emit(&entries)?;
        Ok(entries)
    }

    /// Write the PATH script for the shell wrapper, replacing any previous one.
    pub fn emit(&self, entries: &[PathBuf]) -> Result<PathBuf, DvmError> {
        let script_path = self.config.output_script_path();
        write_script(&script_path, self.config.shell, entries).map_err(|e| {
            DvmError::runtime_with(
                format!("Unable to write PATH script to {}.", script_path.display()),
                e,
            )
        })?;

        tracing::debug!("Wrote PATH script to {}", script_path.display());
        Ok(script_path)
    }

    fn lookup(&self, entries: &[PathBuf]) -> Option<PathBuf> {
        if entries.is_empty() {
            return None;
        }
        let paths = join_entries(entries).ok()?;
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(&self.binary_name, Some(paths), cwd).ok()
    }

    /// Docker client currently resolvable on PATH.
    pub fn which(&self) -> Option<PathBuf> {
        self.lookup(&self.config.path)
    }

    /// Docker client resolvable once managed entries are removed.
    pub fn system_binary(&self) -> Option<PathBuf> {
        self.lookup(&self.unmanaged_path())
    }

    pub fn experimental_binary(&self) -> Option<PathBuf> {
        let path = self
            .config
            .version_dir(EXPERIMENTAL)
            .join(&self.binary_name);
        path.is_file().then_some(path)
    }

    /// Label of the active Docker client: `system (<v>)`, `experimental (<v>)`
    /// or the probed version. `None` when nothing is resolvable or the binary
    /// does not report a version.
    pub fn current<P: VersionProbe>(&self, probe: &P) -> Option<String> {
        let current = self.which()?;
        let version = match probe.probe(&current) {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!("Unable to probe {}: {:#}", current.display(), e);
                return None;
            }
        };

        if self.experimental_binary().as_deref() == Some(current.as_path()) {
            return Some(format!("{} ({})", EXPERIMENTAL, version));
        }

        if self.system_binary().as_deref() == Some(current.as_path()) {
            return Some(format!("{} ({})", SYSTEM, version));
        }

        Some(version)
    }
}

fn write_script(path: &Path, shell: ShellFormat, entries: &[PathBuf]) -> Result<()> {
    let contents = render_script(shell, entries)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    fs::write(path, contents)?;
    Ok(())
}
