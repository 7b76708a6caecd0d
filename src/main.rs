mod activate;
mod alias;
mod catalog;
mod cli;
mod commands;
mod config;
mod download;
mod error;
mod install;
mod platform;
mod probe;
mod resolve;
mod types;
mod upgrade;
mod version_ref;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Dvm;
use config::Config;
use console::style;
use error::{DvmError, EXIT_RUNTIME_ERROR};
use upgrade::UpgradeOutcome;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_RUNTIME_ERROR);
        }
    };

    setup_logging(&config);
    tracing::debug!("dvm home: {}", config.dvm_dir.display());
    tracing::debug!("Shell format: {}", config.shell);

    let debug = config.debug;
    let dvm = Dvm::from_config(config);

    if let Err(e) = run(&dvm, cli.command).await {
        tracing::error!("{}", e);
        if debug {
            if let Some(detail) = e.detail() {
                tracing::error!("{}", detail);
            }
        }
        std::process::exit(e.exit_code());
    }
}

async fn run<C, D, P, B>(dvm: &Dvm<C, D, P, B>, command: Commands) -> Result<(), DvmError>
where
    C: catalog::RemoteCatalog,
    D: download::Downloader,
    P: probe::VersionProbe,
    B: upgrade::BinaryInstaller,
{
    match command {
        Commands::Install { version } => {
            dvm.install(&version.unwrap_or_default()).await?;
        }

        Commands::Uninstall { version } => {
            dvm.uninstall(&version.unwrap_or_default())?;
        }

        Commands::Use { version } => {
            dvm.use_version(&version.unwrap_or_default()).await?;
        }

        Commands::Deactivate => {
            dvm.deactivate()?;
        }

        Commands::Current => match dvm.current() {
            Some(current) => println!("{}", current),
            None => println!("N/A"),
        },

        Commands::Which => {
            if let Some(path) = dvm.which() {
                println!("{}", path.display());
            }
        }

        Commands::Alias { alias, version } => {
            dvm.alias(&alias.unwrap_or_default(), &version.unwrap_or_default())?;
        }

        Commands::Unalias { alias } => {
            dvm.unalias(&alias.unwrap_or_default())?;
        }

        Commands::List { pattern } => {
            for version in dvm.list(&pattern.unwrap_or_default()) {
                if version.active {
                    println!("{}", style(format!("->\t{}", version.label)).green());
                } else {
                    println!("\t{}", version.label);
                }
            }
        }

        Commands::ListRemote { pattern } => {
            for version in dvm.list_remote(&pattern.unwrap_or_default()).await? {
                println!("{}", version);
            }
        }

        Commands::ListAlias { format } => {
            let aliases = dvm.list_aliases();
            match format.as_str() {
                "plain" => {
                    for entry in &aliases {
                        println!("\t{} -> {}", entry.alias, entry.version);
                    }
                }
                "json" => {
                    let out = serde_json::to_string_pretty(&aliases)
                        .map_err(|e| DvmError::runtime_with("Unable to format aliases", e))?;
                    println!("{}", out);
                }
                "yaml" => {
                    let out = serde_yaml::to_string(&aliases)
                        .map_err(|e| DvmError::runtime_with("Unable to format aliases", e))?;
                    print!("{}", out);
                }
                other => {
                    return Err(DvmError::invalid_argument(format!(
                        "Unsupported format '{}'. Use plain, json or yaml.",
                        other
                    )));
                }
            }
        }

        Commands::Upgrade { check, version } => {
            match dvm
                .upgrade(check, version.as_deref(), env!("CARGO_PKG_VERSION"))
                .await?
            {
                UpgradeOutcome::AlreadyInstalled(version)
                | UpgradeOutcome::Available(version)
                | UpgradeOutcome::Upgraded(version) => {
                    tracing::debug!("Upgrade target: {}", version)
                }
                UpgradeOutcome::UpToDate => {}
            }
        }
    }

    Ok(())
}

fn setup_logging(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if config.silent {
        "error"
    } else if config.debug {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr; stdout carries command results
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .without_time()
        .init();
}
