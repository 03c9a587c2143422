mod actions;
mod assets;
mod menu;
mod settings;
mod shell;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::actions::Actions;
use crate::assets::AppPaths;
use crate::menu::Rofi;
use crate::settings::SettingsStore;
use crate::shell::Outcome;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "rofi-manager",
    version,
    about = "Manage rofi modes, scripts and themes from rofi itself",
    long_about = None
)]
struct Cli {
    /// Directory holding config.conf, scripts/ and themes/.
    #[arg(long, value_name = "PATH", env = "ROFI_MANAGER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Selector executable.
    #[arg(long, value_name = "PROGRAM", env = "ROFI_MANAGER_ROFI", default_value = "rofi")]
    rofi: String,

    /// Log verbosity, overridden by RUST_LOG.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Unable to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(file).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_file.as_deref())?;

    let root = match cli.config_dir {
        Some(dir) => dir,
        None => AppPaths::default_root()?,
    };
    let paths = AppPaths::new(root)?;
    let mut store = SettingsStore::load(&paths.config_file);
    let mut actions = Actions::new(Rofi::new(cli.rofi), paths);
    info!(
        root = %actions.paths().root.display(),
        config = %store.path().display(),
        modes = store.enabled_modes().len(),
        scripts = store.enabled_scripts().len(),
        theme = store.settings().theme.as_deref().unwrap_or("none"),
        "Starting rofi-manager"
    );

    match shell::run(&mut actions, &mut store)? {
        Outcome::Quit => Ok(()),
        Outcome::Launch(request) => {
            let status = actions.menu_mut().launch(&request)?;
            if !status.success() {
                warn!(status = ?status.code(), mode = %request.mode, "Launched mode exited with failure");
            }
            Ok(())
        }
    }
}
