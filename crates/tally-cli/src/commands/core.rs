//! Shared utilities for commands
//!
//! This module contains:
//! - `load_settings` - Resolve and parse the settings file
//! - `open_store` - Open the learned pattern store, honoring `--store`

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{PatternStore, Settings};
use tracing::debug;

/// Load settings from an explicit file, the data dir override, or the defaults
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    Settings::load(config).context("Failed to load settings")
}

/// Open the pattern store; `--store` wins over the configured path
pub fn open_store(settings: &Settings, store_override: Option<&Path>) -> PatternStore {
    let store = match store_override {
        Some(path) => PatternStore::new(path, settings.store.builtin_patterns),
        None => PatternStore::from_settings(settings),
    };
    debug!("Using pattern store at {}", store.path().display());
    store
}
