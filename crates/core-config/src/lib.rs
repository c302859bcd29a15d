//! Configuration loading and parsing.
//!
//! Reads `bibliotheca.toml` (or an override path supplied by the binary).
//! Every section and field is optional; anything absent takes its default.
//! Unknown fields are ignored so older binaries tolerate newer files. A file
//! that fails to parse is reported at warn level and replaced by defaults.
//!
//! ```toml
//! [views]
//! repl_title = "Daemonium Bibliotheca"
//! untitled_title = "New File"
//! editing_prefix = "Editing: "
//!
//! [[files.open_filters]]
//! description = "Ritual"
//! patterns = ["*.ritual"]
//!
//! [clipboard]
//! backend = "memory"
//!
//! [logging]
//! file = "bibliotheca.log"
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "bibliotheca.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewsConfig {
    #[serde(default = "ViewsConfig::default_repl_title")]
    pub repl_title: String,
    #[serde(default = "ViewsConfig::default_editor_title")]
    pub editor_title: String,
    #[serde(default = "ViewsConfig::default_untitled_title")]
    pub untitled_title: String,
    #[serde(default = "ViewsConfig::default_editing_prefix")]
    pub editing_prefix: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            repl_title: Self::default_repl_title(),
            editor_title: Self::default_editor_title(),
            untitled_title: Self::default_untitled_title(),
            editing_prefix: Self::default_editing_prefix(),
        }
    }
}

impl ViewsConfig {
    fn default_repl_title() -> String {
        "Daemonium Bibliotheca".to_string()
    }
    fn default_editor_title() -> String {
        "Daemonium Bibliotheca Editor".to_string()
    }
    fn default_untitled_title() -> String {
        "New File".to_string()
    }
    fn default_editing_prefix() -> String {
        "Editing: ".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub description: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FilterConfig {
    fn new(description: &str, patterns: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    #[serde(default = "FilesConfig::default_open_filters")]
    pub open_filters: Vec<FilterConfig>,
    #[serde(default = "FilesConfig::default_save_filters")]
    pub save_filters: Vec<FilterConfig>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            open_filters: Self::default_open_filters(),
            save_filters: Self::default_save_filters(),
        }
    }
}

impl FilesConfig {
    fn default_open_filters() -> Vec<FilterConfig> {
        vec![
            FilterConfig::new("Ritual", &["*.ritual"]),
            FilterConfig::new("Text", &["*.txt"]),
        ]
    }
    fn default_save_filters() -> Vec<FilterConfig> {
        vec![FilterConfig::new("Ritual", &["*.ritual"])]
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    /// OS clipboard; falls back to memory when unavailable.
    #[default]
    System,
    /// In-process clipboard only.
    Memory,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ClipboardConfig {
    #[serde(default)]
    pub backend: ClipboardBackend,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
        }
    }
}

impl LoggingConfig {
    fn default_file() -> PathBuf {
        PathBuf::from("bibliotheca.log")
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile, // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Config path following platform conventions: working directory first, then
/// the user config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("bibliotheca").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}
