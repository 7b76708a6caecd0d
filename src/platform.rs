use crate::config::{DOCKER_MIRROR_URL, DVM_RELEASE_URL, EXPERIMENTAL_MIRROR_URL};
use crate::types::PlatformInfo;
use crate::version_ref::EXPERIMENTAL;

pub const DOCKER_BINARY_STEM: &str = "docker";
pub const DVM_BINARY_STEM: &str = "dvm-helper";

pub fn get_system_info() -> PlatformInfo {
    platform_info(std::env::consts::OS, std::env::consts::ARCH)
}

/// Translate Rust's target names into the mirrors' directory names.
pub fn platform_info(os: &str, arch: &str) -> PlatformInfo {
    let mirror_os = match os {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    };

    let mirror_arch = match arch {
        "x86_64" => "x86_64".to_string(),
        "x86" => "i386".to_string(),
        "aarch64" => "arm64".to_string(),
        "arm" => "armel".to_string(),
        other => other.to_string(),
    };

    let binary_ext = if os == "windows" { ".exe" } else { "" };

    PlatformInfo {
        os: mirror_os,
        arch: mirror_arch,
        binary_ext: binary_ext.to_string(),
    }
}

impl PlatformInfo {
    /// File name of the Docker client inside a version directory.
    pub fn docker_binary_name(&self) -> String {
        format!("{}{}", DOCKER_BINARY_STEM, self.binary_ext)
    }

    /// Mirror URL for a Docker client build. The experimental channel lives on
    /// its own host and is always published as `latest`.
    pub fn docker_download_url(&self, version: &str) -> String {
        let (mirror, version) = if version == EXPERIMENTAL {
            (EXPERIMENTAL_MIRROR_URL, "latest")
        } else {
            (DOCKER_MIRROR_URL, version)
        };

        format!(
            "{}/{}/{}/{}-{}{}",
            mirror, self.os, self.arch, DOCKER_BINARY_STEM, version, self.binary_ext
        )
    }

    /// Download URL for a dvm release of this platform.
    pub fn dvm_release_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}{}",
            DVM_RELEASE_URL,
            version.trim_start_matches('v'),
            self.os,
            self.arch,
            DVM_BINARY_STEM,
            self.binary_ext
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_info() {
        let info = get_system_info();
        assert!(!info.os.is_empty());
        assert!(!info.arch.is_empty());
    }

    #[test]
    fn test_mirror_names() {
        let linux = platform_info("linux", "x86_64");
        assert_eq!(linux.os, "Linux");
        assert_eq!(linux.arch, "x86_64");
        assert_eq!(linux.docker_binary_name(), "docker");

        let mac = platform_info("macos", "x86");
        assert_eq!(mac.os, "Darwin");
        assert_eq!(mac.arch, "i386");

        let windows = platform_info("windows", "x86_64");
        assert_eq!(windows.os, "Windows");
        assert_eq!(windows.docker_binary_name(), "docker.exe");
    }

    #[test]
    fn test_docker_download_url() {
        let linux = platform_info("linux", "x86_64");
        assert_eq!(
            linux.docker_download_url("1.10.0"),
            "https://get.docker.com/builds/Linux/x86_64/docker-1.10.0"
        );
        assert_eq!(
            linux.docker_download_url("experimental"),
            "https://experimental.docker.com/builds/Linux/x86_64/docker-latest"
        );

        let windows = platform_info("windows", "x86_64");
        assert_eq!(
            windows.docker_download_url("1.9.1"),
            "https://get.docker.com/builds/Windows/x86_64/docker-1.9.1.exe"
        );
    }

    #[test]
    fn test_dvm_release_url() {
        let mac = platform_info("macos", "x86_64");
        assert_eq!(
            mac.dvm_release_url("v0.6.0"),
            "https://download.getcarina.com/dvm/0.6.0/Darwin/x86_64/dvm-helper"
        );
    }
}
