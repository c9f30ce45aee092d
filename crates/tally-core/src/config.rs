//! Settings for the pattern store, fallback categories and CSV import
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/tally/config.toml) when it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../../../config/settings.toml");

/// Directory name under the platform data dir
pub const APP_DIR_NAME: &str = "tally";

/// File name of the learned pattern store
pub const STORE_FILE_NAME: &str = "categorized_titles.json";

/// File name of the category list written next to the store by seeding
pub const CATEGORIES_FILE_NAME: &str = "categories.json";

/// Pattern store settings
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Learned pattern file (None = data dir default)
    pub path: Option<PathBuf>,
    /// Whether the embedded keyword rules apply beneath learned patterns
    pub builtin_patterns: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            builtin_patterns: true,
        }
    }
}

/// Categories used when no pattern matches a title
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySettings {
    /// Unmatched titles starting with a digit
    pub numeric_prefix: String,
    /// Every other unmatched title
    pub default: String,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            numeric_prefix: "Personal Services".to_string(),
            default: "Other".to_string(),
        }
    }
}

/// CSV import settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    /// Column delimiter (None = auto-detect)
    pub delimiter: Option<u8>,
    /// Drop rows with a negative amount
    pub skip_credits: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            delimiter: None,
            skip_credits: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub store: StoreSettings,
    pub categories: CategorySettings,
    pub import: ImportSettings,
}

impl Settings {
    /// Load settings (explicit path, then data dir override, then embedded defaults)
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let content = if let Some(path) = explicit_path {
            debug!("Loading settings from {}", path.display());
            fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?
        } else {
            match default_config_path() {
                Some(path) if path.exists() => {
                    debug!("Loading settings override from {}", path.display());
                    fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?
                }
                _ => DEFAULT_SETTINGS.to_string(),
            }
        };

        parse_settings(&content)
    }

    /// Resolve the learned pattern file path
    ///
    /// Priority: `store.path` setting > data dir > current directory.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .or_else(default_store_path)
            .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
    }
}

/// Default settings override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Default learned pattern file path
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join(STORE_FILE_NAME))
}

/// Raw settings structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    store: Option<RawStore>,
    categories: Option<RawCategories>,
    import: Option<RawImport>,
}

#[derive(Debug, Deserialize)]
struct RawStore {
    path: Option<PathBuf>,
    builtin_patterns: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    numeric_prefix: Option<String>,
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImport {
    delimiter: Option<String>,
    skip_credits: Option<bool>,
}

fn parse_settings(content: &str) -> Result<Settings> {
    let raw: RawSettings = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(store) = raw.store {
        if let Some(path) = store.path {
            settings.store.path = Some(path);
        }
        if let Some(builtin) = store.builtin_patterns {
            settings.store.builtin_patterns = builtin;
        }
    }

    if let Some(categories) = raw.categories {
        if let Some(name) = categories.numeric_prefix {
            settings.categories.numeric_prefix = non_empty_category("numeric_prefix", name)?;
        }
        if let Some(name) = categories.default {
            settings.categories.default = non_empty_category("default", name)?;
        }
    }

    if let Some(import) = raw.import {
        if let Some(delimiter) = import.delimiter {
            settings.import.delimiter = Some(parse_delimiter(&delimiter)?);
        }
        if let Some(skip) = import.skip_credits {
            settings.import.skip_credits = skip;
        }
    }

    Ok(settings)
}

fn non_empty_category(key: &str, name: String) -> Result<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config(format!("categories.{} must not be empty", key)));
    }
    Ok(name)
}

fn parse_delimiter(value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ if value == "\\t" => Ok(b'\t'),
        _ => Err(Error::Config(format!(
            "import.delimiter must be a single character, got {:?}",
            value
        ))),
    }
}
