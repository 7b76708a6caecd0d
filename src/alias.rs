use crate::config::Config;
use crate::error::DvmError;
use crate::types::AliasEntry;
use crate::version_ref::is_single_segment;
use std::fs;
use std::path::{Path, PathBuf};

/// One file per alias under `<dvm_dir>/alias`, holding the target version.
pub struct AliasStore {
    alias_dir: PathBuf,
    bin_root: PathBuf,
}

impl AliasStore {
    pub fn new(config: &Config) -> Self {
        Self {
            alias_dir: config.alias_dir(),
            bin_root: config.bin_root(),
        }
    }

    fn alias_path(&self, alias: &str) -> PathBuf {
        self.alias_dir.join(alias)
    }

    pub fn exists(&self, alias: &str) -> bool {
        is_single_segment(alias) && self.alias_path(alias).is_file()
    }

    /// Target version of `alias`, if it exists and is readable.
    pub fn get(&self, alias: &str) -> Option<String> {
        if !self.exists(alias) {
            return None;
        }

        match fs::read_to_string(self.alias_path(alias)) {
            Ok(version) => Some(version.trim().to_string()),
            Err(e) => {
                tracing::debug!("Unable to read alias {}: {}", alias, e);
                None
            }
        }
    }

    pub fn create(&self, alias: &str, version: &str) -> Result<(), DvmError> {
        if alias.is_empty() || version.is_empty() {
            return Err(DvmError::invalid_argument(
                "The alias command requires both an alias name and a version.",
            ));
        }

        if !is_single_segment(alias) {
            return Err(DvmError::invalid_argument(format!(
                "Invalid alias name '{}'.",
                alias
            )));
        }

        if !is_single_segment(version) || !self.bin_root.join(version).is_dir() {
            return Err(DvmError::invalid_argument(format!(
                "The aliased version, {}, is not installed.",
                version
            )));
        }

        let alias_path = self.alias_path(alias);
        if alias_path.exists() {
            tracing::debug!("Overwriting existing alias.");
        }

        write_alias(&alias_path, version).map_err(|e| {
            DvmError::runtime_with(
                format!("Unable to write alias {} at {}.", alias, alias_path.display()),
                e,
            )
        })?;

        tracing::info!("Aliased {} to {}.", alias, version);
        Ok(())
    }

    pub fn remove(&self, alias: &str) -> Result<(), DvmError> {
        if alias.is_empty() {
            return Err(DvmError::invalid_argument(
                "The unalias command requires an alias name.",
            ));
        }

        if !self.exists(alias) {
            tracing::warn!("{} is not an alias.", alias);
            return Ok(());
        }

        let alias_path = self.alias_path(alias);
        fs::remove_file(&alias_path).map_err(|e| {
            DvmError::runtime_with(
                format!("Unable to remove alias {} at {}.", alias, alias_path.display()),
                e,
            )
        })?;

        tracing::info!("Removed alias {}", alias);
        Ok(())
    }

    /// All readable aliases, sorted by name. Unreadable records are skipped.
    pub fn list(&self) -> Vec<AliasEntry> {
        let entries = match fs::read_dir(&self.alias_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("No aliases at {}: {}", self.alias_dir.display(), e);
                return Vec::new();
            }
        };

        let mut aliases: Vec<AliasEntry> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let alias = entry.file_name().to_string_lossy().to_string();
                match fs::read_to_string(entry.path()) {
                    Ok(version) => Some(AliasEntry {
                        alias,
                        version: version.trim().to_string(),
                    }),
                    Err(e) => {
                        tracing::debug!("Excluding alias {}: {}", alias, e);
                        None
                    }
                }
            })
            .collect();

        aliases.sort_by(|a, b| a.alias.cmp(&b.alias));
        aliases
    }
}

fn write_alias(path: &Path, version: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, version)
}
