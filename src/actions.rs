use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::assets::{self, AppPaths, AssetError, AssetKind};
use crate::menu::{choose, Choice, LaunchRequest, MenuEntry, Selector};
use crate::settings::{Mode, SettingsStore};

const CONFIRM_NO: &str = "No";
const CONFIRM_YES: &str = "Yes";

#[derive(Debug)]
pub enum Flow {
    Continue,
    Launch(LaunchRequest),
}

pub struct Actions<S> {
    menu: S,
    paths: AppPaths,
}

impl<S: Selector> Actions<S> {
    pub fn new(menu: S, paths: AppPaths) -> Self {
        Self { menu, paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub(crate) fn menu_mut(&mut self) -> &mut S {
        &mut self.menu
    }

    pub fn active_theme(&self, store: &SettingsStore) -> Option<PathBuf> {
        store
            .enabled_theme()
            .and_then(|name| self.paths.existing(AssetKind::Theme, name))
    }

    pub fn show_info(&mut self, store: &SettingsStore, message: &str) -> Result<()> {
        let theme = self.active_theme(store);
        self.menu
            .select(message, &["OK".to_string()], theme.as_deref())?;
        Ok(())
    }

    pub fn select_mode(&mut self, store: &SettingsStore) -> Result<Flow> {
        let modes = store.enabled_modes().to_vec();
        if modes.is_empty() {
            self.show_info(store, "No modes enabled.")?;
            return Ok(Flow::Continue);
        }
        let entries: Vec<MenuEntry<Mode>> = modes
            .iter()
            .map(|mode| MenuEntry::new(mode.as_str(), *mode))
            .collect();
        let theme = self.active_theme(store);
        match choose(&mut self.menu, "Select mode", &entries, theme.as_deref())? {
            Choice::Picked(mode) => Ok(Flow::Launch(self.launch_request(store, *mode))),
            Choice::Dismissed | Choice::Unmatched(_) => Ok(Flow::Continue),
        }
    }

    fn launch_request(&self, store: &SettingsStore, mode: Mode) -> LaunchRequest {
        let mut scripts = Vec::new();
        for script in store.enabled_scripts() {
            let name = script.trim_end_matches(AssetKind::Script.extension());
            if name.parse::<Mode>().is_ok() {
                debug!(script = %script, "Script name clashes with a built-in mode");
                continue;
            }
            match self.paths.existing(AssetKind::Script, script) {
                Some(path) => scripts.push(format!("{name}:{}", path.display())),
                None => debug!(script = %script, "Skipping missing script"),
            }
        }

        let mut modi = Vec::new();
        if !scripts.is_empty() {
            modi.push(mode.as_str().to_string());
            modi.extend(scripts);
        }
        LaunchRequest {
            mode,
            modi,
            theme: self.active_theme(store),
        }
    }

    pub fn toggle_modes(&mut self, store: &mut SettingsStore) -> Result<()> {
        loop {
            let enabled = store.enabled_modes();
            let entries: Vec<MenuEntry<Mode>> = Mode::ALL
                .iter()
                .map(|mode| MenuEntry::checkbox(enabled.contains(mode), mode.as_str(), *mode))
                .collect();
            let theme = self.active_theme(store);
            let mode = match choose(
                &mut self.menu,
                "Toggle modes (Enter to finish)",
                &entries,
                theme.as_deref(),
            )? {
                Choice::Dismissed => return Ok(()),
                Choice::Unmatched(text) => {
                    debug!(text = %text, "Ignoring unknown mode entry");
                    continue;
                }
                Choice::Picked(mode) => *mode,
            };

            let mut modes = store.enabled_modes().to_vec();
            if let Some(idx) = modes.iter().position(|enabled| *enabled == mode) {
                modes.remove(idx);
                info!(%mode, "Mode disabled");
            } else {
                modes.push(mode);
                info!(%mode, "Mode enabled");
            }
            store.set_enabled_modes(modes);
        }
    }

    pub fn enable_script(&mut self, store: &mut SettingsStore) -> Result<()> {
        let scripts = self.paths.list_scripts();
        if scripts.is_empty() {
            return self.show_info(store, "No scripts found.");
        }
        loop {
            let entries: Vec<MenuEntry<String>> = scripts
                .iter()
                .map(|name| {
                    let checked = store.enabled_scripts().contains(name);
                    MenuEntry::checkbox(checked, name, name.clone())
                })
                .collect();
            let theme = self.active_theme(store);
            let script = match choose(
                &mut self.menu,
                "Toggle scripts (Enter to finish)",
                &entries,
                theme.as_deref(),
            )? {
                Choice::Dismissed => return Ok(()),
                Choice::Unmatched(text) => {
                    debug!(text = %text, "Ignoring unknown script entry");
                    continue;
                }
                Choice::Picked(script) => script.clone(),
            };

            let mut enabled = store.enabled_scripts().clone();
            if !enabled.remove(&script) {
                enabled.insert(script.clone());
            }
            info!(script = %script, enabled = enabled.contains(&script), "Script toggled");
            store.set_enabled_scripts(enabled);
        }
    }

    pub fn enable_theme(&mut self, store: &mut SettingsStore) -> Result<()> {
        let themes = self.paths.list_themes();
        if themes.is_empty() {
            return self.show_info(store, "No themes found.");
        }
        loop {
            let active = store.enabled_theme().map(str::to_string);
            let entries: Vec<MenuEntry<String>> = themes
                .iter()
                .map(|name| {
                    MenuEntry::checkbox(active.as_deref() == Some(name.as_str()), name, name.clone())
                })
                .collect();
            let theme = self.active_theme(store);
            let picked = match choose(
                &mut self.menu,
                "Select theme (Enter to escape)",
                &entries,
                theme.as_deref(),
            )? {
                Choice::Dismissed => return Ok(()),
                Choice::Unmatched(text) => {
                    debug!(text = %text, "Ignoring unknown theme entry");
                    continue;
                }
                Choice::Picked(name) => name.clone(),
            };

            if active.as_deref() == Some(picked.as_str()) {
                info!(theme = %picked, "Theme cleared");
                store.set_enabled_theme(None);
            } else {
                info!(theme = %picked, "Theme selected");
                store.set_enabled_theme(Some(picked));
            }
        }
    }

    pub fn add_script(&mut self, store: &SettingsStore) -> Result<()> {
        self.add_asset(store, AssetKind::Script)
    }

    pub fn add_theme(&mut self, store: &SettingsStore) -> Result<()> {
        self.add_asset(store, AssetKind::Theme)
    }

    fn add_asset(&mut self, store: &SettingsStore, kind: AssetKind) -> Result<()> {
        let theme = self.active_theme(store);
        let prompt = format!("Path to {} ({})", kind.noun(), kind.extension());
        let raw = self
            .menu
            .select(&prompt, &[String::new()], theme.as_deref())?;
        if raw.is_empty() {
            return Ok(());
        }

        let source = assets::expand_home(&raw);
        let dest = match assets::plan_import(&self.paths, kind, &source) {
            Ok(dest) => dest,
            Err(err) => return self.report(store, kind, err),
        };

        if dest.exists() {
            let name = dest
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let answer = self.menu.select(
                &format!("Overwrite {name}?"),
                &[CONFIRM_NO.to_string(), CONFIRM_YES.to_string()],
                theme.as_deref(),
            )?;
            if answer != CONFIRM_YES {
                debug!(dest = %dest.display(), "Overwrite declined");
                return Ok(());
            }
        }

        match assets::copy_asset(kind, &source, &dest) {
            Ok(()) => Ok(()),
            Err(err) => self.report(store, kind, err),
        }
    }

    fn report(&mut self, store: &SettingsStore, kind: AssetKind, err: AssetError) -> Result<()> {
        warn!(kind = kind.noun(), error = %err, "Asset import failed");
        self.show_info(store, &err.to_string())
    }
}
