use crate::catalog::{is_upgrade_available, RemoteCatalog};
use crate::download::{Downloader, HttpDownloader};
use crate::error::DvmError;
use crate::platform::DVM_BINARY_STEM;
use crate::types::PlatformInfo;
use anyhow::{Context, Result};

/// Replaces the running executable with a verified download.
#[allow(async_fn_in_trait)]
pub trait BinaryInstaller {
    /// Must leave the current executable untouched unless the new binary
    /// passed verification.
    async fn replace_self(&self, url: &str) -> Result<()>;
}

pub struct SelfReplaceInstaller {
    downloader: HttpDownloader,
}

impl SelfReplaceInstaller {
    pub fn new(downloader: HttpDownloader) -> Self {
        Self { downloader }
    }
}

impl BinaryInstaller for SelfReplaceInstaller {
    async fn replace_self(&self, url: &str) -> Result<()> {
        let staging = tempfile::tempdir().context("Could not create staging directory")?;
        let new_binary = staging.path().join(DVM_BINARY_STEM);

        // Checksum failure returns here, before anything is swapped
        self.downloader
            .download_with_checksum(url, &new_binary)
            .await?;

        tracing::debug!("Replacing {} via self-replace", DVM_BINARY_STEM);
        self_replace::self_replace(&new_binary).context("Could not replace the dvm executable")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The requested version is the one already running
    AlreadyInstalled(String),
    UpToDate,
    Available(String),
    Upgraded(String),
}

pub struct SelfUpgrader<'a, C, B> {
    catalog: &'a C,
    installer: &'a B,
    platform: PlatformInfo,
    current_version: &'a str,
}

impl<'a, C, B> SelfUpgrader<'a, C, B>
where
    C: RemoteCatalog,
    B: BinaryInstaller,
{
    pub fn new(
        catalog: &'a C,
        installer: &'a B,
        platform: PlatformInfo,
        current_version: &'a str,
    ) -> Self {
        Self {
            catalog,
            installer,
            platform,
            current_version,
        }
    }

    pub async fn upgrade(
        &self,
        check_only: bool,
        version: Option<&str>,
    ) -> Result<UpgradeOutcome, DvmError> {
        let version = version.map(str::trim).filter(|v| !v.is_empty());

        if let Some(version) = version {
            if version.trim_start_matches('v') == self.current_version.trim_start_matches('v') {
                tracing::warn!("dvm {} is already installed.", version);
                return Ok(UpgradeOutcome::AlreadyInstalled(version.to_string()));
            }
        }

        let version = match version {
            Some(version) => version.to_string(),
            None => match is_upgrade_available(self.catalog, self.current_version).await {
                (true, Some(latest)) => latest,
                _ => {
                    tracing::info!("The latest version of dvm is already installed.");
                    return Ok(UpgradeOutcome::UpToDate);
                }
            },
        };

        if check_only {
            tracing::info!(
                "dvm {} is available. Run `dvm upgrade` to install the latest version.",
                version
            );
            return Ok(UpgradeOutcome::Available(version));
        }

        tracing::info!("Upgrading to dvm {}...", version);
        let url = self.platform.dvm_release_url(&version);
        self.installer.replace_self(&url).await.map_err(|e| {
            DvmError::runtime_with(format!("Unable to upgrade dvm to {}.", version), e)
        })?;

        tracing::info!("dvm has been upgraded to {}.", version);
        Ok(UpgradeOutcome::Upgraded(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::FakeCatalog;
    use crate::platform::platform_info;
    use anyhow::anyhow;
    use std::cell::RefCell;

    struct RecordingInstaller {
        fail: bool,
        urls: RefCell<Vec<String>>,
    }

    impl RecordingInstaller {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl BinaryInstaller for RecordingInstaller {
        async fn replace_self(&self, url: &str) -> Result<()> {
            self.urls.borrow_mut().push(url.to_string());
            if self.fail {
                Err(anyhow!("Checksum mismatch"))
            } else {
                Ok(())
            }
        }
    }

    fn linux() -> PlatformInfo {
        platform_info("linux", "x86_64")
    }

    #[tokio::test]
    async fn test_check_only_never_installs() {
        let catalog = FakeCatalog::with_latest("0.6.0");
        let installer = RecordingInstaller::new(false);
        let upgrader = SelfUpgrader::new(&catalog, &installer, linux(), "0.5.0");

        assert_eq!(
            upgrader.upgrade(true, None).await.unwrap(),
            UpgradeOutcome::Available("0.6.0".to_string())
        );
        assert_eq!(
            upgrader.upgrade(true, Some("0.7.0")).await.unwrap(),
            UpgradeOutcome::Available("0.7.0".to_string())
        );
        assert!(installer.urls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_same_version_is_a_no_op() {
        let catalog = FakeCatalog::offline();
        let installer = RecordingInstaller::new(false);
        let upgrader = SelfUpgrader::new(&catalog, &installer, linux(), "0.5.0");

        assert_eq!(
            upgrader.upgrade(false, Some("0.5.0")).await.unwrap(),
            UpgradeOutcome::AlreadyInstalled("0.5.0".to_string())
        );
        assert!(installer.urls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_release_endpoint_is_not_fatal() {
        let catalog = FakeCatalog::offline();
        let installer = RecordingInstaller::new(false);
        let upgrader = SelfUpgrader::new(&catalog, &installer, linux(), "0.5.0");

        assert_eq!(
            upgrader.upgrade(false, None).await.unwrap(),
            UpgradeOutcome::UpToDate
        );
        assert!(installer.urls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_upgrade_downloads_release_for_platform() {
        let catalog = FakeCatalog::with_latest("0.6.0");
        let installer = RecordingInstaller::new(false);
        let upgrader = SelfUpgrader::new(&catalog, &installer, linux(), "0.5.0");

        assert_eq!(
            upgrader.upgrade(false, None).await.unwrap(),
            UpgradeOutcome::Upgraded("0.6.0".to_string())
        );
        assert_eq!(
            installer.urls.borrow().as_slice(),
            ["https://download.getcarina.com/dvm/0.6.0/Linux/x86_64/dvm-helper"]
        );
    }

    #[tokio::test]
    async fn test_failed_replacement_is_runtime_error() {
        let catalog = FakeCatalog::with_latest("0.6.0");
        let installer = RecordingInstaller::new(true);
        let upgrader = SelfUpgrader::new(&catalog, &installer, linux(), "0.5.0");

        let err = upgrader.upgrade(false, None).await.unwrap_err();
        assert!(matches!(err, DvmError::Runtime { .. }));
    }
}
