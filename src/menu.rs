use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::settings::Mode;

pub trait Selector {
    /// Shows `options` under `prompt` and blocks until the user picks one.
    /// A dismissed menu yields an empty string.
    fn select(&mut self, prompt: &str, options: &[String], theme: Option<&Path>) -> Result<String>;
}

impl<S: Selector + ?Sized> Selector for &mut S {
    fn select(&mut self, prompt: &str, options: &[String], theme: Option<&Path>) -> Result<String> {
        (**self).select(prompt, options, theme)
    }
}

pub struct Rofi {
    program: String,
}

impl Rofi {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn launch(&self, request: &LaunchRequest) -> Result<ExitStatus> {
        info!(program = %self.program, mode = %request.mode, "Launching mode");
        Command::new(&self.program)
            .args(request.args())
            .status()
            .with_context(|| format!("Failed to launch {}", self.program))
    }
}

impl Selector for Rofi {
    fn select(&mut self, prompt: &str, options: &[String], theme: Option<&Path>) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.arg("-dmenu").arg("-p").arg(prompt);
        if let Some(theme) = theme.filter(|path| path.is_file()) {
            command.arg("-theme").arg(theme);
        }
        command.stdin(Stdio::piped()).stdout(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to launch {}", self.program))?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(options.join("\n").as_bytes()) {
                debug!(error = %err, "Selector closed its input early");
            }
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed waiting for {}", self.program))?;

        if !output.status.success() {
            debug!(prompt, status = ?output.status.code(), "Menu dismissed");
            return Ok(String::new());
        }
        let choice = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(prompt, choice = %choice, "Menu selection");
        Ok(choice)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    pub mode: Mode,
    pub modi: Vec<String>,
    pub theme: Option<PathBuf>,
}

impl LaunchRequest {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-show".into(), self.mode.as_str().into()];
        if !self.modi.is_empty() {
            args.push("-modi".into());
            args.push(self.modi.join(",").into());
        }
        if let Some(theme) = &self.theme {
            args.push("-theme".into());
            args.push(theme.into());
        }
        args
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry<K> {
    pub label: String,
    pub key: K,
}

impl<K> MenuEntry<K> {
    pub fn new(label: impl Into<String>, key: K) -> Self {
        Self {
            label: label.into(),
            key,
        }
    }

    pub fn checkbox(checked: bool, name: &str, key: K) -> Self {
        let mark = if checked { "[x]" } else { "[ ]" };
        Self::new(format!("{mark} {name}"), key)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Choice<'a, K> {
    Dismissed,
    Picked(&'a K),
    Unmatched(String),
}

pub fn choose<'a, K, S>(
    menu: &mut S,
    prompt: &str,
    entries: &'a [MenuEntry<K>],
    theme: Option<&Path>,
) -> Result<Choice<'a, K>>
where
    S: Selector + ?Sized,
{
    let labels: Vec<String> = entries.iter().map(|entry| entry.label.clone()).collect();
    let choice = menu.select(prompt, &labels, theme)?;
    if choice.is_empty() {
        return Ok(Choice::Dismissed);
    }
    Ok(entries
        .iter()
        .find(|entry| entry.label == choice)
        .map(|entry| Choice::Picked(&entry.key))
        .unwrap_or(Choice::Unmatched(choice)))
}



#[cfg(all(test, unix))]
mod rofi_tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use tempfile::TempDir;

    /// Stand-in selector that records its arguments and input, then prints
    /// `output` and exits with `code`.
    fn fake_selector(dir: &TempDir, output: &str, code: i32) -> PathBuf {
        let root = dir.path();
        let script = root.join("fake-rofi");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{args}'\ncat > '{input}'\nprintf '%s' '{output}'\nexit {code}\n",
            args = root.join("args").display(),
            input = root.join("stdin").display(),
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn recorded_args(dir: &TempDir) -> Vec<String> {
        fs::read_to_string(dir.path().join("args"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn select_trims_output_and_feeds_options() {
        let dir = TempDir::new().unwrap();
        let mut rofi = Rofi::new(fake_selector(&dir, "  picked  \n", 0).to_string_lossy());

        let choice = rofi.select("P", &options(&["one", "two"]), None).unwrap();

        assert_eq!(choice, "picked");
        assert_eq!(recorded_args(&dir), vec!["-dmenu", "-p", "P"]);
        assert_eq!(fs::read_to_string(dir.path().join("stdin")).unwrap(), "one\ntwo");
    }

    #[test]
    fn select_returns_empty_on_failure_exit() {
        let dir = TempDir::new().unwrap();
        let mut rofi = Rofi::new(fake_selector(&dir, "ignored", 1).to_string_lossy());

        let choice = rofi.select("P", &options(&["one"]), None).unwrap();

        assert_eq!(choice, "");
    }

    #[test]
    fn select_passes_theme_only_when_present() {
        let dir = TempDir::new().unwrap();
        let mut rofi = Rofi::new(fake_selector(&dir, "x", 0).to_string_lossy());
        let theme = dir.path().join("nord.rasi");

        rofi.select("P", &options(&["a"]), Some(&theme)).unwrap();
        assert_eq!(recorded_args(&dir), vec!["-dmenu", "-p", "P"]);

        fs::write(&theme, "").unwrap();
        rofi.select("P", &options(&["a"]), Some(&theme)).unwrap();
        assert_eq!(
            recorded_args(&dir),
            vec![
                "-dmenu".to_string(),
                "-p".to_string(),
                "P".to_string(),
                "-theme".to_string(),
                theme.display().to_string(),
            ]
        );
    }

    #[test]
    fn select_fails_when_program_is_missing() {
        let dir = TempDir::new().unwrap();
        let mut rofi = Rofi::new(dir.path().join("no-such-rofi").to_string_lossy());

        assert!(rofi.select("P", &options(&["a"]), None).is_err());
    }
}
