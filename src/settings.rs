use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use ini::{Ini, ParseOption};
use tracing::{debug, info, warn};

const MODES_SECTION: &str = "modes";
const SCRIPTS_SECTION: &str = "scripts";
const THEME_SECTION: &str = "theme";
const ENABLED_KEY: &str = "enabled";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Run,
    Drun,
    Window,
    Ssh,
    Filebrowser,
    Key,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Run,
        Mode::Drun,
        Mode::Window,
        Mode::Ssh,
        Mode::Filebrowser,
        Mode::Key,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Run => "run",
            Mode::Drun => "drun",
            Mode::Window => "window",
            Mode::Ssh => "ssh",
            Mode::Filebrowser => "filebrowser",
            Mode::Key => "key",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| format!("unknown mode '{value}'"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub modes: Vec<Mode>,
    pub scripts: BTreeSet<String>,
    pub theme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modes: vec![Mode::Run, Mode::Drun, Mode::Window],
            scripts: BTreeSet::new(),
            theme: None,
        }
    }
}

impl Settings {
    fn from_ini(conf: &Ini) -> Self {
        let mut modes = Vec::new();
        for name in split_list(enabled_value(conf, MODES_SECTION)) {
            match name.parse::<Mode>() {
                Ok(mode) if !modes.contains(&mode) => modes.push(mode),
                Ok(_) => {}
                Err(err) => warn!(%err, "Dropping mode from settings"),
            }
        }

        let scripts = split_list(enabled_value(conf, SCRIPTS_SECTION))
            .map(str::to_string)
            .collect();

        let theme = enabled_value(conf, THEME_SECTION).trim();
        Self {
            modes,
            scripts,
            theme: (!theme.is_empty()).then(|| theme.to_string()),
        }
    }

    fn to_ini(&self) -> Ini {
        let modes = self
            .modes
            .iter()
            .map(|mode| mode.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let scripts = self
            .scripts
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut conf = Ini::new();
        conf.with_section(Some(MODES_SECTION)).set(ENABLED_KEY, modes);
        conf.with_section(Some(SCRIPTS_SECTION)).set(ENABLED_KEY, scripts);
        conf.with_section(Some(THEME_SECTION))
            .set(ENABLED_KEY, self.theme.clone().unwrap_or_default());
        conf
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }
}

fn enabled_value<'a>(conf: &'a Ini, section: &str) -> &'a str {
    conf.section(Some(section))
        .and_then(|props| props.get(ENABLED_KEY))
        .unwrap_or_default()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// In-memory settings bound to the file they persist to. Every setter writes
/// the whole file straight away; write failures are logged and otherwise ignored.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let options = ParseOption {
            enabled_quote: false,
            ..ParseOption::default()
        };
        let settings = match Ini::load_from_file_opt(&path, options) {
            Ok(conf) => {
                debug!(path = %path.display(), "Loaded settings");
                Settings::from_ini(&conf)
            }
            Err(err) => {
                match &err {
                    ini::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                        info!(path = %path.display(), "No settings file, writing defaults")
                    }
                    _ => warn!(path = %path.display(), error = %err, "Unreadable settings, restoring defaults"),
                }
                let defaults = Settings::default();
                if let Err(err) = defaults.save(&path) {
                    warn!(path = %path.display(), error = %err, "Failed to write default settings");
                }
                defaults
            }
        };
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn enabled_modes(&self) -> &[Mode] {
        &self.settings.modes
    }

    pub fn set_enabled_modes(&mut self, modes: Vec<Mode>) {
        let mut unique = Vec::with_capacity(modes.len());
        for mode in modes {
            if !unique.contains(&mode) {
                unique.push(mode);
            }
        }
        self.settings.modes = unique;
        self.persist();
    }

    pub fn enabled_scripts(&self) -> &BTreeSet<String> {
        &self.settings.scripts
    }

    pub fn set_enabled_scripts(&mut self, scripts: BTreeSet<String>) {
        self.settings.scripts = scripts;
        self.persist();
    }

    pub fn enabled_theme(&self) -> Option<&str> {
        self.settings.theme.as_deref()
    }

    pub fn set_enabled_theme(&mut self, theme: Option<String>) {
        self.settings.theme = theme.filter(|name| !name.trim().is_empty());
        self.persist();
    }

    fn persist(&self) {
        match self.settings.save(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Settings saved"),
            Err(err) => warn!(path = %self.path.display(), error = %err, "Failed to save settings"),
        }
    }
}
