use crate::activate::PathActivator;
use crate::alias::AliasStore;
use crate::config::Config;
use crate::error::DvmError;
use crate::version_ref::{is_single_segment, VersionRef};
use std::path::PathBuf;

/// Outcome of resolving a version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The Docker client found on PATH once managed entries are removed
    System(PathBuf),
    /// A concrete version name, `experimental` included
    Version(String),
}

/// Turns user input into something activatable. Read-only.
pub struct VersionResolver<'a> {
    config: &'a Config,
    aliases: &'a AliasStore,
}

impl<'a> VersionResolver<'a> {
    pub fn new(config: &'a Config, aliases: &'a AliasStore) -> Self {
        Self { config, aliases }
    }

    pub fn resolve(&self, token: &str) -> Result<Resolved, DvmError> {
        let token = match token.trim() {
            "" => self.config.docker_version.clone().unwrap_or_default(),
            t => t.to_string(),
        };

        let version_ref = VersionRef::parse(&token).map_err(|_| {
            DvmError::invalid_argument(
                "The use command requires that a version is specified or the DOCKER_VERSION environment variable is set.",
            )
        })?;

        match version_ref {
            VersionRef::System => PathActivator::new(self.config)
                .system_binary()
                .map(Resolved::System)
                .ok_or_else(|| DvmError::invalid_operation("System version of Docker not found.")),
            VersionRef::Experimental => Ok(Resolved::Version(version_ref.to_string())),
            VersionRef::Named(name) => {
                // Exactly one level of indirection
                let version = match self.aliases.get(&name) {
                    Some(target) => {
                        tracing::debug!("Using alias: {} -> {}", name, target);
                        target
                    }
                    None => name,
                };

                // Applies to alias targets read from disk as well
                if !is_single_segment(&version) {
                    return Err(DvmError::invalid_argument(format!(
                        "Invalid version '{}'.",
                        version
                    )));
                }
                Ok(Resolved::Version(version))
            }
        }
    }
}
