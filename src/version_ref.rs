use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const SYSTEM: &str = "system";
pub const EXPERIMENTAL: &str = "experimental";

/// Upstream tags that name a release: `v` followed by MAJOR.MINOR.PATCH with a
/// non-zero major.
fn release_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v([1-9]\d*\.\d+\.\d+)$").expect("static regex"))
}

/// Numeric portion of a release tag, or `None` when the tag is not one.
pub fn release_tag_version(tag: &str) -> Option<&str> {
    release_tag_regex()
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Version and alias names are used as directory or file names, so they must
/// be exactly one path segment.
pub fn is_single_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\\')
}

/// A version as typed by the user, before alias lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRef {
    System,
    Experimental,
    Named(String),
}

impl VersionRef {
    /// Parse a version token. Surrounding whitespace is ignored.
    pub fn parse(token: &str) -> Result<Self, String> {
        let token = token.trim();
        if token.is_empty() {
            return Err("Version cannot be empty".to_string());
        }

        Ok(match token {
            SYSTEM => VersionRef::System,
            EXPERIMENTAL => VersionRef::Experimental,
            other => VersionRef::Named(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            VersionRef::System => SYSTEM,
            VersionRef::Experimental => EXPERIMENTAL,
            VersionRef::Named(name) => name,
        }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reserved_tokens() {
        assert_eq!(VersionRef::parse("system").unwrap(), VersionRef::System);
        assert_eq!(
            VersionRef::parse(" experimental ").unwrap(),
            VersionRef::Experimental
        );
        assert_eq!(
            VersionRef::parse("1.10.0").unwrap(),
            VersionRef::Named("1.10.0".to_string())
        );
        assert!(VersionRef::parse("  ").is_err());
    }

    #[test]
    fn test_is_single_segment() {
        assert!(is_single_segment("1.10.0"));
        assert!(is_single_segment("experimental"));
        assert!(is_single_segment("..hidden"));
        assert!(!is_single_segment(""));
        assert!(!is_single_segment("."));
        assert!(!is_single_segment(".."));
        assert!(!is_single_segment("../.."));
        assert!(!is_single_segment("1.10.0/docker"));
        assert!(!is_single_segment("..\\evil"));
    }

    #[test]
    fn test_release_tag_version() {
        assert_eq!(release_tag_version("v1.10.0"), Some("1.10.0"));
        assert_eq!(release_tag_version("v17.1.2"), Some("17.1.2"));
        assert_eq!(release_tag_version("v0.9.0"), None);
        assert_eq!(release_tag_version("1.10.0"), None);
        assert_eq!(release_tag_version("v1.10.0-rc1"), None);
        assert_eq!(release_tag_version("v17.03.0-ce"), None);
    }
}
