use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Not every test binary uses every helper.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub dvm_dir: PathBuf,
    pub system_bin: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dvm_dir = temp_dir.path().join("dvm");
        let system_bin = temp_dir.path().join("system-bin");
        fs::create_dir_all(&dvm_dir).expect("Failed to create dvm dir");
        fs::create_dir_all(&system_bin).expect("Failed to create system bin dir");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_dvm"));

        Self {
            _temp_dir: temp_dir,
            dvm_dir,
            system_bin,
            bin_path,
        }
    }

    /// dvm with an isolated home and a PATH holding only the fake system dir.
    pub fn cmd(&self) -> Command {
        self.cmd_with_path(&[self.system_bin.clone()])
    }

    pub fn cmd_with_path(&self, path: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("DVM_DIR", &self.dvm_dir);
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("PATH", std::env::join_paths(path).expect("Invalid test PATH"));
        cmd.env("SHELL", "/bin/bash");
        cmd.env_remove("DOCKER_VERSION");
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("DVM_SILENT");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.dvm_dir.join("bin").join("docker").join(version)
    }

    pub fn output_script(&self, ext: &str) -> PathBuf {
        self.dvm_dir.join(".tmp").join(format!("dvm-output.{}", ext))
    }

    /// Lay down an installed version whose client reports `reported`.
    pub fn install_fake(&self, version: &str, reported: &str) -> PathBuf {
        let dir = self.version_dir(version);
        write_fake_docker(&dir, reported);
        dir
    }

    pub fn install_system_docker(&self, reported: &str) {
        write_fake_docker(&self.system_bin, reported);
    }
}

#[allow(dead_code)]
pub fn write_fake_docker(dir: &Path, reported: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create docker dir");
    let binary = dir.join("docker");
    let script = format!(
        "#!/bin/sh\necho \"Docker version {}, build 0000000\"\n",
        reported
    );
    fs::write(&binary, script).expect("Failed to write fake docker");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&binary).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&binary, perms).unwrap();
    }

    binary
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Unexpected exit code\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
