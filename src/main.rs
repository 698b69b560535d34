use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hearthlog::paths;
use hearthlog::{ConfigStore, ConsolePrompt, InstallDirectoryResolver, TomlConfig, VersionLocator};

#[derive(Parser)]
#[command(version = paths::APP_VERSION, about = "Locate Hearthstone and print its version")]
struct Args {
    /// Config file (defaults to config.toml in the user data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save this Hearthstone directory before looking
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Fail instead of asking for the directory
    #[arg(long)]
    no_prompt: bool,

    /// Log every lookup step
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<bool> {
    let config_path = match args.config {
        Some(path) => path,
        None => paths::config_file().context("could not determine the user data directory")?,
    };
    let mut config = TomlConfig::open(&config_path)?;
    tracing::debug!("config: {}", config.path().display());

    if let Some(dir) = &args.dir {
        config
            .write_string(paths::INSTALL_DIR_KEY, &dir.to_string_lossy())
            .with_context(|| format!("failed to save {}", paths::INSTALL_DIR_KEY))?;
    }

    let locator = VersionLocator::native();
    let version = if args.no_prompt {
        Some(locator.locate(&config)).filter(|v| !v.is_unknown())
    } else {
        InstallDirectoryResolver::new(locator, config, ConsolePrompt::stdio()).resolve_version()
    };

    match version {
        Some(version) => {
            println!("Hearthstone v{version} (0x{:016X})", version.as_u64());
            Ok(true)
        }
        None => {
            eprintln!("Hearthstone not found");
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
