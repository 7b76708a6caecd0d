use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Script dialect used when emitting the PATH assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShellFormat {
    #[default]
    Sh,
    PowerShell,
    Cmd,
}

impl ShellFormat {
    /// Interpret a `--shell` value or `$SHELL`. Paths such as `/bin/bash` are
    /// reduced to their file stem; anything unrecognised falls back to sh.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let stem = Path::new(value)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match stem.as_str() {
            "powershell" | "pwsh" => ShellFormat::PowerShell,
            "cmd" => ShellFormat::Cmd,
            _ => ShellFormat::Sh,
        }
    }

    pub fn script_extension(&self) -> &'static str {
        match self {
            ShellFormat::Sh => "sh",
            ShellFormat::PowerShell => "ps1",
            ShellFormat::Cmd => "cmd",
        }
    }
}

impl fmt::Display for ShellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellFormat::Sh => write!(f, "sh"),
            ShellFormat::PowerShell => write!(f, "powershell"),
            ShellFormat::Cmd => write!(f, "cmd"),
        }
    }
}

/// Host naming as used by the Docker and dvm download mirrors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
    pub binary_ext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubTag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
}

/// One row of `dvm list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedVersion {
    pub label: String,
    pub active: bool,
}
