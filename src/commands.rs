//! Command flows. Each public method backs one subcommand.

use crate::activate::PathActivator;
use crate::alias::AliasStore;
use crate::catalog::{available_versions, GitHubCatalog, RemoteCatalog};
use crate::config::Config;
use crate::download::{Downloader, HttpDownloader};
use crate::error::DvmError;
use crate::install::InstallManager;
use crate::platform::get_system_info;
use crate::probe::{DockerCliProbe, VersionProbe};
use crate::resolve::{Resolved, VersionResolver};
use crate::types::{AliasEntry, ListedVersion, PlatformInfo};
use crate::upgrade::{BinaryInstaller, SelfReplaceInstaller, SelfUpgrader, UpgradeOutcome};
use std::path::PathBuf;

pub struct Dvm<C, D, P, B> {
    config: Config,
    catalog: C,
    downloader: D,
    probe: P,
    installer: B,
    platform: PlatformInfo,
}

impl Dvm<GitHubCatalog, HttpDownloader, DockerCliProbe, SelfReplaceInstaller> {
    /// Wire up the real network, process and filesystem collaborators.
    pub fn from_config(config: Config) -> Self {
        let show_progress = !config.silent;
        Self {
            catalog: GitHubCatalog::new(&config),
            downloader: HttpDownloader::new(show_progress),
            probe: DockerCliProbe,
            installer: SelfReplaceInstaller::new(HttpDownloader::new(show_progress)),
            platform: get_system_info(),
            config,
        }
    }
}

impl<C, D, P, B> Dvm<C, D, P, B>
where
    C: RemoteCatalog,
    D: Downloader,
    P: VersionProbe,
    B: BinaryInstaller,
{
    pub fn new(
        config: Config,
        catalog: C,
        downloader: D,
        probe: P,
        installer: B,
        platform: PlatformInfo,
    ) -> Self {
        Self {
            config,
            catalog,
            downloader,
            probe,
            installer,
            platform,
        }
    }

    fn installs(&self) -> InstallManager<'_, C, D, P> {
        InstallManager::new(
            &self.config,
            &self.catalog,
            &self.downloader,
            &self.probe,
            self.platform.clone(),
        )
    }

    fn activator(&self) -> PathActivator<'_> {
        PathActivator::new(&self.config)
    }

    fn activate(&self, version: &str) -> Result<Vec<PathBuf>, DvmError> {
        let entries = self.activator().use_version(version)?;
        tracing::info!("Now using Docker {}", version);
        Ok(entries)
    }

    /// Install a version and make it active. Returns the new PATH.
    pub async fn install(&self, version: &str) -> Result<Vec<PathBuf>, DvmError> {
        let version = self.installs().install(version).await?;
        self.activate(&version)
    }

    pub fn uninstall(&self, version: &str) -> Result<(), DvmError> {
        self.installs().uninstall(version)
    }

    /// Resolve `token`, install it if missing and make it active. Returns the
    /// new PATH.
    pub async fn use_version(&self, token: &str) -> Result<Vec<PathBuf>, DvmError> {
        let aliases = AliasStore::new(&self.config);
        let resolved = VersionResolver::new(&self.config, &aliases).resolve(token)?;

        match resolved {
            Resolved::System(binary) => {
                let entries = self.activator().deactivate()?;
                match self.probe.probe(&binary) {
                    Ok(version) => {
                        tracing::info!("Now using system version of Docker: {}", version)
                    }
                    Err(_) => tracing::info!(
                        "Now using system version of Docker at {}",
                        binary.display()
                    ),
                }
                Ok(entries)
            }
            Resolved::Version(version) => {
                let installs = self.installs();
                if !installs.is_installed(&version) {
                    tracing::info!("{} is not installed. Installing now...", version);
                    installs.install(&version).await?;
                }
                self.activate(&version)
            }
        }
    }

    pub fn deactivate(&self) -> Result<Vec<PathBuf>, DvmError> {
        self.activator().deactivate()
    }

    pub fn current(&self) -> Option<String> {
        self.activator().current(&self.probe)
    }

    pub fn which(&self) -> Option<PathBuf> {
        self.activator().which()
    }

    pub fn alias(&self, alias: &str, version: &str) -> Result<(), DvmError> {
        AliasStore::new(&self.config).create(alias.trim(), version.trim())
    }

    pub fn unalias(&self, alias: &str) -> Result<(), DvmError> {
        AliasStore::new(&self.config).remove(alias.trim())
    }

    pub fn list_aliases(&self) -> Vec<AliasEntry> {
        AliasStore::new(&self.config).list()
    }

    /// Installed versions matching `pattern`, with the active one flagged.
    pub fn list(&self, pattern: &str) -> Vec<ListedVersion> {
        let current = self.current();
        self.installs()
            .installed_versions(pattern)
            .into_iter()
            .map(|label| ListedVersion {
                active: current.as_deref() == Some(label.as_str()),
                label,
            })
            .collect()
    }

    pub async fn list_remote(&self, pattern: &str) -> Result<Vec<String>, DvmError> {
        available_versions(&self.catalog, pattern).await
    }

    pub async fn upgrade(
        &self,
        check_only: bool,
        version: Option<&str>,
        current_version: &str,
    ) -> Result<UpgradeOutcome, DvmError> {
        SelfUpgrader::new(
            &self.catalog,
            &self.installer,
            self.platform.clone(),
            current_version,
        )
        .upgrade(check_only, version)
        .await
    }
}
