use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Theme,
}

impl AssetKind {
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Script => ".sh",
            AssetKind::Theme => ".rasi",
        }
    }

    pub fn permissions(self) -> u32 {
        match self {
            AssetKind::Script => 0o755,
            AssetKind::Theme => 0o644,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::Theme => "theme",
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("File does not exist.")]
    Missing,
    #[error("File must end with {0}")]
    WrongExtension(&'static str),
    #[error("File name must not contain commas.")]
    CommaInName,
    #[error("Error copying file:\n{0}")]
    Copy(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub scripts_dir: PathBuf,
    pub themes_dir: PathBuf,
}

impl AppPaths {
    pub fn default_root() -> Result<PathBuf> {
        let config = dirs::config_dir().context("Unable to determine config directory")?;
        Ok(config.join("rofi-manager"))
    }

    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let paths = Self {
            config_file: root.join("config.conf"),
            scripts_dir: root.join("scripts"),
            themes_dir: root.join("themes"),
            root,
        };
        for dir in [&paths.scripts_dir, &paths.themes_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Unable to create {}", dir.display()))?;
        }
        Ok(paths)
    }

    pub fn dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Script => &self.scripts_dir,
            AssetKind::Theme => &self.themes_dir,
        }
    }

    pub fn list(&self, kind: AssetKind) -> Vec<String> {
        list_assets(self.dir(kind), kind.extension())
    }

    pub fn list_scripts(&self) -> Vec<String> {
        self.list(AssetKind::Script)
    }

    pub fn list_themes(&self) -> Vec<String> {
        self.list(AssetKind::Theme)
    }

    /// Managed path for `name`, only when that file is still on disk.
    pub fn existing(&self, kind: AssetKind, name: &str) -> Option<PathBuf> {
        let path = self.dir(kind).join(name);
        path.is_file().then_some(path)
    }
}

pub fn list_assets(dir: &Path, extension: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "Asset directory unreadable");
            return Vec::new();
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(extension))
        .collect();
    names.sort();
    names
}

pub fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim();
    match raw.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(raw),
        },
        None => PathBuf::from(raw),
    }
}

/// Checks a user supplied source path and returns where it would land.
pub fn plan_import(
    paths: &AppPaths,
    kind: AssetKind,
    source: &Path,
) -> Result<PathBuf, AssetError> {
    if !source.exists() {
        return Err(AssetError::Missing);
    }
    let file_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| name.ends_with(kind.extension()))
        .ok_or(AssetError::WrongExtension(kind.extension()))?;
    if file_name.contains(',') {
        return Err(AssetError::CommaInName);
    }
    Ok(paths.dir(kind).join(file_name))
}

pub fn copy_asset(kind: AssetKind, source: &Path, dest: &Path) -> Result<(), AssetError> {
    let data = fs::read(source)?;
    fs::write(dest, data)?;
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(dest)?.permissions();
        perms.set_mode(kind.permissions());
        fs::set_permissions(dest, perms)?;
    }
    info!(
        kind = kind.noun(),
        source = %source.display(),
        dest = %dest.display(),
        "Copied asset"
    );
    Ok(())
}
