use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Store
    #[serde(rename = "store.databasePath")]
    pub database_path: PathBuf,

    // Member snapshot spreadsheet
    #[serde(rename = "snapshot.path")]
    pub snapshot_path: PathBuf,

    #[serde(rename = "snapshot.autoSync")]
    pub snapshot_auto_sync: bool,

    /// Extra legacy header → canonical column entries for member sheets.
    #[serde(rename = "snapshot.columnAliases")]
    pub column_aliases: BTreeMap<String, String>,

    // Export
    #[serde(rename = "export.directory")]
    pub export_directory: PathBuf,

    // Listing
    #[serde(rename = "page.defaultSize")]
    pub page_size: u32,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("jlife.db"),
            snapshot_path: PathBuf::from("update.xlsx"),
            snapshot_auto_sync: false,
            column_aliases: BTreeMap::new(),
            export_directory: PathBuf::from("exports"),
            page_size: 10,
            log_level: "info".to_string(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // SQLite database file
    "store.databasePath": "jlife.db",

    // Member snapshot spreadsheet refreshed by `jlife snapshot`
    "snapshot.path": "update.xlsx",
    // Refresh the snapshot after every `jlife member add`
    "snapshot.autoSync": false,
    // Extra legacy headers, e.g. { "會員號碼": "會員編號" }
    "snapshot.columnAliases": {},

    // Where `jlife export` writes when no -o is given
    "export.directory": "exports",

    // Default page size for list commands
    "page.defaultSize": 10,

    // error, warn, info, debug, trace (RUST_LOG overrides)
    "log.level": "info"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jlife");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, writing a commented default
    /// file on first use.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "cannot create config directory");
                return;
            }
        }
        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            tracing::warn!(error = %e, "cannot write default settings.json");
        }
    }
}
