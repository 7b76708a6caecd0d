use clap::{Parser, Subcommand};

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");
    let commit = option_env!("DVM_GIT_COMMIT").unwrap_or("unknown");

    // Leaked once at startup for clap's 'static requirement
    let version = format!("{} ({})", BASE_VERSION, commit);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "dvm")]
#[command(about = "Manage multiple versions of the Docker client")]
#[command(version = get_version())]
pub struct Cli {
    /// Increase the GitHub API rate limit by specifying a personal access token [env: GITHUB_TOKEN]
    #[arg(long, global = true)]
    pub github_token: Option<String>,

    /// Alternate dvm home directory, defaults to the directory of the executable [env: DVM_DIR]
    #[arg(long, global = true)]
    pub dvm_dir: Option<String>,

    /// Shell format for emitted environment changes: powershell, cmd or sh [env: SHELL]
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Print additional debug information
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress output. Errors will still be displayed [env: DVM_SILENT]
    #[arg(long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a Docker version, using $DOCKER_VERSION if the version is not specified
    #[command(
        visible_alias = "i",
        after_help = "Examples:\n  dvm install 1.10.0\n  dvm install experimental"
    )]
    Install {
        /// Version to install (e.g., '1.10.0' or 'experimental')
        version: Option<String>,
    },

    /// Uninstall a Docker version
    Uninstall {
        /// Version to uninstall
        version: Option<String>,
    },

    /// Use a Docker version, using $DOCKER_VERSION if the version is not specified
    #[command(after_help = "Examples:\n  dvm use 1.10.0\n  dvm use system\n  dvm use experimental")]
    Use {
        /// Version, alias, 'system' or 'experimental'
        version: Option<String>,
    },

    /// Undo the effects of dvm on the current shell
    Deactivate,

    /// Print the current Docker version
    Current,

    /// Print the path to the current Docker version
    Which,

    /// Create an alias to a Docker version
    Alias {
        /// Alias name (e.g., 'prod')
        alias: Option<String>,
        /// Installed version the alias points to
        version: Option<String>,
    },

    /// Remove a Docker version alias
    Unalias {
        /// Alias name
        alias: Option<String>,
    },

    /// List installed Docker versions
    #[command(visible_alias = "ls")]
    List {
        /// Only show versions starting with this pattern
        pattern: Option<String>,
    },

    /// List available Docker versions
    #[command(visible_alias = "ls-remote")]
    ListRemote {
        /// Regular expression matched against the upstream tag name
        pattern: Option<String>,
    },

    /// List Docker version aliases
    #[command(visible_alias = "ls-alias")]
    ListAlias {
        /// Output format (plain, json, yaml)
        #[arg(long, default_value = "plain")]
        format: String,
    },

    /// Upgrade dvm to the latest release
    Upgrade {
        /// Check whether a newer version of dvm is available without upgrading
        #[arg(long)]
        check: bool,
        /// Upgrade to the specified version
        #[arg(long)]
        version: Option<String>,
    },
}
