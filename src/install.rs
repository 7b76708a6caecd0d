//! Install and uninstall Docker client versions.
//!
//! A version is installed exactly when `<bin_root>/<version>` exists.

use crate::activate::PathActivator;
use crate::catalog::{version_exists, RemoteCatalog};
use crate::config::Config;
use crate::download::Downloader;
use crate::error::DvmError;
use crate::probe::VersionProbe;
use crate::types::PlatformInfo;
use crate::version_ref::{is_single_segment, EXPERIMENTAL, SYSTEM};
use regex::Regex;
use std::fs;
use std::path::PathBuf;

pub struct InstallManager<'a, C, D, P> {
    config: &'a Config,
    catalog: &'a C,
    downloader: &'a D,
    probe: &'a P,
    platform: PlatformInfo,
}

impl<'a, C, D, P> InstallManager<'a, C, D, P>
where
    C: RemoteCatalog,
    D: Downloader,
    P: VersionProbe,
{
    pub fn new(
        config: &'a Config,
        catalog: &'a C,
        downloader: &'a D,
        probe: &'a P,
        platform: PlatformInfo,
    ) -> Self {
        Self {
            config,
            catalog,
            downloader,
            probe,
            platform,
        }
    }

    pub fn is_installed(&self, version: &str) -> bool {
        !version.is_empty() && self.config.version_dir(version).is_dir()
    }

    pub fn binary_path(&self, version: &str) -> PathBuf {
        self.config
            .version_dir(version)
            .join(self.platform.docker_binary_name())
    }

    /// Make sure `version` is present locally and return the concrete version
    /// that was installed. Activation is left to the caller.
    pub async fn install(&self, version: &str) -> Result<String, DvmError> {
        let version = match version.trim() {
            "" => self.config.docker_version.clone().unwrap_or_default(),
            v => v.to_string(),
        };

        if version.is_empty() {
            return Err(DvmError::invalid_argument(
                "The install command requires that a version is specified or the DOCKER_VERSION environment variable is set.",
            ));
        }

        if !is_single_segment(&version) {
            return Err(DvmError::invalid_argument(format!(
                "Invalid version '{}'.",
                version
            )));
        }

        if !version_exists(self.catalog, &version).await? {
            return Err(DvmError::invalid_operation(format!(
                "Version {} not found - try `dvm ls-remote` to browse available versions.",
                version
            )));
        }

        let version_dir = self.config.version_dir(&version);

        // Experimental is always reinstalled to pick up the latest build
        if version == EXPERIMENTAL && version_dir.exists() {
            fs::remove_dir_all(&version_dir).map_err(|e| {
                DvmError::runtime_with(
                    format!(
                        "Unable to remove experimental version at {}.",
                        version_dir.display()
                    ),
                    e,
                )
            })?;
        }

        if version_dir.exists() {
            tracing::warn!("{} is already installed", version);
            return Ok(version);
        }

        tracing::info!("Installing {}...", version);

        let url = self.platform.docker_download_url(&version);
        let binary_path = self.binary_path(&version);
        if let Err(e) = self
            .downloader
            .download_with_checksum(&url, &binary_path)
            .await
        {
            // A leftover directory would read as installed
            if version_dir.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&version_dir) {
                    tracing::debug!(
                        "Unable to clean up {}: {}",
                        version_dir.display(),
                        cleanup
                    );
                }
            }
            return Err(DvmError::runtime_with(
                format!("Unable to download Docker {} from {}.", version, url),
                e,
            ));
        }

        tracing::debug!("Installed Docker {} to {}.", version, binary_path.display());
        Ok(version)
    }

    pub fn uninstall(&self, version: &str) -> Result<(), DvmError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(DvmError::invalid_argument(
                "The uninstall command requires that a version is specified.",
            ));
        }

        if !is_single_segment(version) {
            return Err(DvmError::invalid_argument(format!(
                "Invalid version '{}'.",
                version
            )));
        }

        if self.is_active(version) {
            return Err(DvmError::invalid_operation(
                "Cannot uninstall the currently active Docker version.",
            ));
        }

        let version_dir = self.config.version_dir(version);
        if !version_dir.exists() {
            tracing::warn!("{} is not installed.", version);
            return Ok(());
        }

        fs::remove_dir_all(&version_dir).map_err(|e| {
            DvmError::runtime_with(
                format!(
                    "Unable to uninstall Docker version {} located in {}.",
                    version,
                    version_dir.display()
                ),
                e,
            )
        })?;

        tracing::info!("Uninstalled Docker {}.", version);
        Ok(())
    }

    /// The active client either lives in the version's directory or reports
    /// that version.
    fn is_active(&self, version: &str) -> bool {
        let activator = PathActivator::new(self.config);
        let version_dir = self.config.version_dir(version);
        if activator
            .which()
            .is_some_and(|current| current.starts_with(&version_dir))
        {
            return true;
        }

        activator.current(self.probe).as_deref() == Some(version)
    }

    /// Installed versions whose name matches the glob `<pattern>*`, with
    /// experimental and system shown as `name (<probed version>)`.
    pub fn installed_versions(&self, pattern: &str) -> Vec<String> {
        let matcher = glob_prefix_regex(pattern);
        let mut results = Vec::new();

        if let Ok(entries) = fs::read_dir(self.config.bin_root()) {
            for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                if !matcher.is_match(&name) {
                    continue;
                }

                if name == EXPERIMENTAL {
                    match self.probe.probe(&self.binary_path(EXPERIMENTAL)) {
                        Ok(version) => results.push(format!("{} ({})", EXPERIMENTAL, version)),
                        Err(e) => tracing::debug!(
                            "Unable to get version of installed experimental version at {}: {:#}",
                            entry.path().display(),
                            e
                        ),
                    }
                    continue;
                }

                results.push(name);
            }
        }

        if matcher.is_match(SYSTEM) {
            let activator = PathActivator::new(self.config);
            if let Some(system) = activator.system_binary() {
                if let Ok(version) = self.probe.probe(&system) {
                    results.push(format!("{} ({})", SYSTEM, version));
                }
            }
        }

        results.sort();
        results
    }
}

/// Regex for the shell glob `<pattern>*`, anchored at both ends.
fn glob_prefix_regex(pattern: &str) -> Regex {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push_str(".*$");
    Regex::new(&re).expect("escaped glob is a valid regex")
}
