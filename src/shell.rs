use anyhow::Result;
use tracing::debug;

use crate::actions::{Actions, Flow};
use crate::menu::{choose, Choice, LaunchRequest, MenuEntry, Selector};
use crate::settings::SettingsStore;

const TITLE: &str = "Rofi Manager";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MainEntry {
    SelectMode,
    ToggleModes,
    EnableScript,
    EnableTheme,
    AddScript,
    AddTheme,
    Exit,
}

impl MainEntry {
    const ALL: [MainEntry; 7] = [
        MainEntry::SelectMode,
        MainEntry::ToggleModes,
        MainEntry::EnableScript,
        MainEntry::EnableTheme,
        MainEntry::AddScript,
        MainEntry::AddTheme,
        MainEntry::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MainEntry::SelectMode => "Select Mode",
            MainEntry::ToggleModes => "Enable/Disable Modes",
            MainEntry::EnableScript => "Enable Script",
            MainEntry::EnableTheme => "Enable Theme",
            MainEntry::AddScript => "Add Script",
            MainEntry::AddTheme => "Add Theme",
            MainEntry::Exit => "Exit",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Quit,
    Launch(LaunchRequest),
}

pub fn run<S: Selector>(actions: &mut Actions<S>, store: &mut SettingsStore) -> Result<Outcome> {
    let entries: Vec<MenuEntry<MainEntry>> = MainEntry::ALL
        .iter()
        .map(|entry| MenuEntry::new(entry.label(), *entry))
        .collect();

    loop {
        let theme = actions.active_theme(store);
        let entry = match choose(actions.menu_mut(), TITLE, &entries, theme.as_deref())? {
            Choice::Dismissed | Choice::Picked(MainEntry::Exit) => return Ok(Outcome::Quit),
            Choice::Unmatched(text) => {
                debug!(text = %text, "Ignoring unknown menu entry");
                continue;
            }
            Choice::Picked(entry) => *entry,
        };
        debug!(entry = entry.label(), "Main menu");

        match entry {
            MainEntry::SelectMode => {
                if let Flow::Launch(request) = actions.select_mode(store)? {
                    return Ok(Outcome::Launch(request));
                }
            }
            MainEntry::ToggleModes => actions.toggle_modes(store)?,
            MainEntry::EnableScript => actions.enable_script(store)?,
            MainEntry::EnableTheme => actions.enable_theme(store)?,
            MainEntry::AddScript => actions.add_script(store)?,
            MainEntry::AddTheme => actions.add_theme(store)?,
            MainEntry::Exit => return Ok(Outcome::Quit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AppPaths;
    use crate::menu::testing::ScriptedMenu;
    use crate::settings::Mode;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AppPaths, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path()).unwrap();
        let store = SettingsStore::load(&paths.config_file);
        (dir, paths, store)
    }

    #[test]
    fn main_menu_lists_seven_entries() {
        let (_dir, paths, mut store) = setup();
        let mut menu = ScriptedMenu::new(["Exit"]);

        let outcome = run(&mut Actions::new(&mut menu, paths), &mut store).unwrap();

        assert!(matches!(outcome, Outcome::Quit));
        assert_eq!(menu.shown[0].prompt, "Rofi Manager");
        assert_eq!(
            menu.shown[0].options,
            vec![
                "Select Mode",
                "Enable/Disable Modes",
                "Enable Script",
                "Enable Theme",
                "Add Script",
                "Add Theme",
                "Exit"
            ]
        );
    }

    #[test]
    fn dismissing_main_menu_quits() {
        let (_dir, paths, mut store) = setup();
        let mut menu = ScriptedMenu::new(Vec::<String>::new());

        let outcome = run(&mut Actions::new(&mut menu, paths), &mut store).unwrap();

        assert!(matches!(outcome, Outcome::Quit));
        assert_eq!(menu.shown.len(), 1);
    }

    #[test]
    fn workflows_return_to_main_menu() {
        let (_dir, paths, mut store) = setup();
        let mut menu = ScriptedMenu::new([
            "Enable Script",
            "",
            "Enable/Disable Modes",
            "[ ] ssh",
            "",
            "bogus",
            "Exit",
        ]);

        let outcome = run(&mut Actions::new(&mut menu, paths), &mut store).unwrap();

        assert!(matches!(outcome, Outcome::Quit));
        assert_eq!(
            menu.prompts(),
            vec![
                "Rofi Manager",
                "No scripts found.",
                "Rofi Manager",
                "Toggle modes (Enter to finish)",
                "Toggle modes (Enter to finish)",
                "Rofi Manager",
                "Rofi Manager"
            ]
        );
        assert!(store.enabled_modes().contains(&Mode::Ssh));
    }

    #[test]
    fn selecting_a_mode_ends_the_loop_with_launch() {
        let (_dir, paths, mut store) = setup();
        let mut menu = ScriptedMenu::new(["Select Mode", "window"]);

        let outcome = run(&mut Actions::new(&mut menu, paths), &mut store).unwrap();

        match outcome {
            Outcome::Launch(request) => assert_eq!(request.mode, Mode::Window),
            Outcome::Quit => panic!("expected a launch"),
        }
        assert_eq!(menu.shown.len(), 2);
    }
}
