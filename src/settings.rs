// src/settings.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use url::Url;

use crate::board::{ThemeController, ThemeWindow};

pub const KEY_SHEET_ID: &str = "swimMeetSheetId";
pub const KEY_MEET_NAME: &str = "swimMeetName";
pub const KEY_AUTO_DARK: &str = "autoDark";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_DARK_START: &str = "darkStart";
pub const KEY_DARK_END: &str = "darkEnd";

pub const DEFAULT_MEET_NAME: &str = "Swim Meet";

static SHEET_ID_IN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("sheet id regex should compile"));

/// Reduce whatever the user pasted to a bare sheet id. A full document URL
/// (`…/spreadsheets/d/<id>/edit#gid=0`) yields `<id>`; anything else is
/// taken as the id itself. Blank input yields `None`.
pub fn extract_sheet_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let id = SHEET_ID_IN_URL
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(input);
    Some(id.to_string())
}

/// Display configuration, mapped to and from the flat key/value store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub sheet_id: Option<String>,
    pub meet_name: Option<String>,
    pub auto_dark: bool,
    /// Last manual choice; what the display shows while `auto_dark` is off.
    pub dark_mode: bool,
    pub dark_window: ThemeWindow,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_id: None,
            meet_name: None,
            auto_dark: true,
            dark_mode: false,
            dark_window: ThemeWindow::default(),
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            warn!(key, value = other, "ignoring invalid flag");
            None
        }
    }
}

fn parse_hour(key: &str, raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(h) if h < 24 => Some(h),
        _ => {
            warn!(key, value = raw, "ignoring invalid hour");
            None
        }
    }
}

impl Settings {
    /// Build from stored pairs. Unknown keys are ignored; malformed values
    /// leave the defaults in place.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut settings = Settings::default();
        settings.apply_map(map);
        settings
    }

    /// Overlay stored pairs onto the current values.
    pub fn apply_map(&mut self, map: &BTreeMap<String, String>) {
        if let Some(id) = map.get(KEY_SHEET_ID).and_then(|v| extract_sheet_id(v)) {
            self.sheet_id = Some(id);
        }
        if let Some(name) = map.get(KEY_MEET_NAME).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            self.meet_name = Some(name.to_string());
        }
        if let Some(auto) = map.get(KEY_AUTO_DARK).and_then(|v| parse_flag(KEY_AUTO_DARK, v)) {
            self.auto_dark = auto;
        }
        if let Some(dark) = map.get(KEY_DARK_MODE).and_then(|v| parse_flag(KEY_DARK_MODE, v)) {
            self.dark_mode = dark;
        }
        if let Some(start) = map.get(KEY_DARK_START).and_then(|v| parse_hour(KEY_DARK_START, v)) {
            self.dark_window.start = start;
        }
        if let Some(end) = map.get(KEY_DARK_END).and_then(|v| parse_hour(KEY_DARK_END, v)) {
            self.dark_window.end = end;
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(id) = &self.sheet_id {
            map.insert(KEY_SHEET_ID.to_string(), id.clone());
        }
        if let Some(name) = &self.meet_name {
            map.insert(KEY_MEET_NAME.to_string(), name.clone());
        }
        map.insert(KEY_AUTO_DARK.to_string(), self.auto_dark.to_string());
        map.insert(KEY_DARK_MODE.to_string(), self.dark_mode.to_string());
        map.insert(KEY_DARK_START.to_string(), self.dark_window.start.to_string());
        map.insert(KEY_DARK_END.to_string(), self.dark_window.end.to_string());
        map
    }

    /// Command-line values win over stored ones.
    pub fn with_overrides(mut self, sheet_id: Option<&str>, meet_name: Option<&str>) -> Self {
        if let Some(id) = sheet_id.and_then(extract_sheet_id) {
            self.sheet_id = Some(id);
        }
        if let Some(name) = meet_name.map(str::trim).filter(|n| !n.is_empty()) {
            self.meet_name = Some(name.to_string());
        }
        self
    }

    /// Theme state to start a display with.
    pub fn theme(&self) -> ThemeController {
        ThemeController::new(self.auto_dark, self.dark_window).with_dark(self.dark_mode)
    }

    pub fn meet_name_or_default(&self) -> &str {
        self.meet_name.as_deref().unwrap_or(DEFAULT_MEET_NAME)
    }

    /// Link that opens the same display elsewhere: `base?sheetId=…&meetName=…`.
    pub fn share_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(k, _)| k != "sheetId" && k != "meetName")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.extend_pairs(kept);
            if let Some(id) = &self.sheet_id {
                pairs.append_pair("sheetId", id);
            }
            if let Some(name) = &self.meet_name {
                pairs.append_pair("meetName", name);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

/// JSON file of string keys to string values.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/heatboard/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("no config directory for this platform")?;
        Ok(dir.join("heatboard").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored pairs. A missing file is empty; an unreadable or malformed one
    /// is logged and treated as empty.
    pub fn read(&self) -> BTreeMap<String, String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file yet");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read settings");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed settings file");
                BTreeMap::new()
            }
        }
    }

    pub fn load(&self) -> Settings {
        Settings::from_map(&self.read())
    }

    /// Persist `settings`, keeping any keys this version does not know about.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let mut map = self.read();
        map.extend(settings.to_map());
        self.write(&map)
    }

    fn write(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating settings directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(map).context("serialising settings")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                tmp.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
