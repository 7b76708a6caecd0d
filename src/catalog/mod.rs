//! Remote catalog of Docker versions and dvm releases.
//!
//! Two queries hit the network: the Docker tag list (used by install and
//! list-remote, failures are fatal) and the latest dvm release (used by
//! upgrade, failures only warn).

pub mod github;

pub use github::GitHubCatalog;

use crate::error::DvmError;
use crate::version_ref::{release_tag_version, EXPERIMENTAL};
use anyhow::Result;
use regex::Regex;

#[allow(async_fn_in_trait)]
pub trait RemoteCatalog {
    /// Tag names of the Docker repository (first page only).
    async fn list_tags(&self) -> Result<Vec<String>>;

    /// Tag of the latest dvm release.
    async fn latest_release_tag(&self) -> Result<String>;
}

/// Keep release tags whose raw name matches `pattern`, returning their version
/// numbers.
///
/// Ordering is plain string ordering, so `1.10.0` sorts before `1.9.0`.
pub fn filter_versions(tags: &[String], pattern: &str) -> Result<Vec<String>, DvmError> {
    let pattern_regex = Regex::new(pattern).map_err(|e| {
        DvmError::InvalidOperation(format!("Invalid pattern '{}': {}", pattern, e))
    })?;

    let mut versions: Vec<String> = tags
        .iter()
        .filter(|tag| pattern_regex.is_match(tag))
        .filter_map(|tag| release_tag_version(tag))
        .map(str::to_string)
        .collect();

    versions.sort();
    Ok(versions)
}

pub async fn available_versions<C: RemoteCatalog>(
    catalog: &C,
    pattern: &str,
) -> Result<Vec<String>, DvmError> {
    let tags = catalog.list_tags().await.map_err(|e| {
        DvmError::runtime_with("Unable to retrieve list of Docker tags from GitHub", e)
    })?;
    tracing::debug!("Retrieved {} Docker tags", tags.len());
    filter_versions(&tags, pattern)
}

/// `experimental` always exists; anything else must be a published release.
pub async fn version_exists<C: RemoteCatalog>(catalog: &C, version: &str) -> Result<bool, DvmError> {
    if version == EXPERIMENTAL {
        return Ok(true);
    }

    let versions = available_versions(catalog, "").await?;
    Ok(versions.iter().any(|v| v == version))
}

/// Whether the latest dvm release is newer than `current_version`, along with
/// the latest tag. Every failure is downgraded to a warning and "no upgrade".
pub async fn is_upgrade_available<C: RemoteCatalog>(
    catalog: &C,
    current_version: &str,
) -> (bool, Option<String>) {
    let latest_tag = match catalog.latest_release_tag().await {
        Ok(tag) => tag,
        Err(e) => {
            tracing::warn!("Unable to query the latest dvm release from GitHub:");
            tracing::warn!("{:#}", e);
            return (false, None);
        }
    };

    let current = match parse_release(current_version) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Unable to parse the current dvm version as a semantic version!");
            tracing::warn!("{}", e);
            return (false, None);
        }
    };

    let latest = match parse_release(&latest_tag) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Unable to parse the latest dvm version as a semantic version!");
            tracing::warn!("{}", e);
            return (false, None);
        }
    };

    (latest > current, Some(latest_tag))
}

fn parse_release(version: &str) -> Result<semver::Version, semver::Error> {
    semver::Version::parse(version.trim().trim_start_matches('v'))
}
