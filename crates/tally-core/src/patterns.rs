//! Learned pattern store
//!
//! Title → category mappings live in a JSON file (a list of `{title, category}`
//! objects) shared across runs. Review sessions append to it; the classifier reads
//! it. Entries are matched by *normalized* title (lowercased, trimmed, internal
//! whitespace collapsed).
//!
//! The embedded keyword rules (config/builtin_patterns.json) sit beneath the learned
//! entries: a learned entry with the same normalized pattern replaces the built-in
//! one.
//!
//! The store is loaded lazily on first use and cached until `invalidate()`, which
//! `update()` calls after every write.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::export::write_json;
use crate::models::{LearnedMapping, PatternEntry, PatternSource};

/// Embedded default keyword rules (compiled into binary)
const BUILTIN_PATTERNS: &str = include_str!("../../../config/builtin_patterns.json");

/// Normalize a title or pattern for comparison
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The embedded keyword rules
pub fn builtin_mappings() -> Result<Vec<LearnedMapping>> {
    serde_json::from_str(BUILTIN_PATTERNS)
        .map_err(|e| Error::PatternStore(format!("Invalid built-in patterns: {}", e)))
}

/// File-backed pattern store with an in-process cache
pub struct PatternStore {
    path: PathBuf,
    builtin: bool,
    cache: RefCell<Option<Rc<[PatternEntry]>>>,
}

impl PatternStore {
    /// Create a store backed by `path`, optionally layering the built-in rules
    pub fn new(path: impl Into<PathBuf>, builtin: bool) -> Self {
        Self {
            path: path.into(),
            builtin,
            cache: RefCell::new(None),
        }
    }

    /// Store backed by `path` with the built-in rules enabled
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true)
    }

    /// Create a store from settings (path resolution and built-in toggle)
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.store_path(), settings.store.builtin_patterns)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a loaded entry list is currently cached
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Effective pattern entries, longest pattern first
    ///
    /// Reads the file on first call and returns the cached list afterwards. A
    /// missing file is an empty learned set; an unreadable or malformed file is an
    /// error.
    pub fn load(&self) -> Result<Rc<[PatternEntry]>> {
        let cached = self.cache.borrow().clone();
        if let Some(entries) = cached {
            return Ok(entries);
        }

        let learned = self.read_learned()?;
        let builtin = if self.builtin {
            builtin_mappings()?
        } else {
            Vec::new()
        };

        let entries: Rc<[PatternEntry]> = build_entries(&learned, &builtin).into();
        debug!(
            "Loaded {} patterns ({} learned) from {}",
            entries.len(),
            entries
                .iter()
                .filter(|e| e.source == PatternSource::Learned)
                .count(),
            self.path.display()
        );

        *self.cache.borrow_mut() = Some(Rc::clone(&entries));
        Ok(entries)
    }

    /// Drop the cached entries so the next `load()` re-reads the file
    pub fn invalidate(&self) {
        if self.cache.borrow_mut().take().is_some() {
            debug!("Pattern cache invalidated");
        }
    }

    /// The learned mappings exactly as persisted
    pub fn learned(&self) -> Result<Vec<LearnedMapping>> {
        self.read_learned()
    }

    /// Merge mappings into the persisted file
    ///
    /// Mappings are keyed by normalized title: a mapping replaces any stored entry
    /// with the same normalized title, and later mappings in `changes` win over
    /// earlier ones. The file is kept sorted by original title. Returns the number
    /// of mappings written.
    pub fn update(&self, changes: &[LearnedMapping]) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut stored = self.read_learned()?;
        let mut written = 0;

        for change in changes {
            let key = normalize_title(&change.title);
            if key.is_empty() {
                warn!(
                    "Ignoring mapping with blank title for '{}'",
                    change.category
                );
                continue;
            }
            stored.retain(|m| normalize_title(&m.title) != key);
            stored.push(LearnedMapping::new(change.title.trim(), change.category.trim()));
            written += 1;
        }

        stored.sort_by(|a, b| a.title.cmp(&b.title));

        write_json(&self.path, &stored).map_err(|e| {
            Error::PatternStore(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        self.invalidate();

        info!(
            "Learned {} title mappings ({} stored) in {}",
            written,
            stored.len(),
            self.path.display()
        );
        Ok(written)
    }

    fn read_learned(&self) -> Result<Vec<LearnedMapping>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No pattern file at {}, starting with an empty learned set",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::PatternStore(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            Error::PatternStore(format!(
                "{} is not a valid pattern file: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Merge learned and built-in mappings into lookup order
///
/// One entry per normalized pattern. Among learned mappings the last one wins;
/// learned entries replace built-in ones. Sorted by pattern length (characters),
/// longest first; the sort is stable, so learned entries lead among equal lengths.
fn build_entries(learned: &[LearnedMapping], builtin: &[LearnedMapping]) -> Vec<PatternEntry> {
    let mut entries: Vec<PatternEntry> = Vec::with_capacity(learned.len() + builtin.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for mapping in learned {
        let pattern = normalize_title(&mapping.title);
        if pattern.is_empty() {
            warn!(
                "Skipping learned entry with blank title ({})",
                mapping.category
            );
            continue;
        }
        match index.get(&pattern) {
            Some(&i) => entries[i].category = mapping.category.clone(),
            None => {
                index.insert(pattern.clone(), entries.len());
                entries.push(PatternEntry {
                    pattern,
                    category: mapping.category.clone(),
                    source: PatternSource::Learned,
                });
            }
        }
    }

    for mapping in builtin {
        let pattern = normalize_title(&mapping.title);
        if pattern.is_empty() || index.contains_key(&pattern) {
            continue;
        }
        index.insert(pattern.clone(), entries.len());
        entries.push(PatternEntry {
            pattern,
            category: mapping.category.clone(),
            source: PatternSource::BuiltIn,
        });
    }

    entries.sort_by(|a, b| b.pattern.chars().count().cmp(&a.pattern.chars().count()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir, builtin: bool) -> PatternStore {
        PatternStore::new(dir.path().join("categorized_titles.json"), builtin)
    }

    fn write_file(store: &PatternStore, mappings: &[LearnedMapping]) {
        write_json(store.path(), mappings).unwrap();
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("  UBER   *ONE\tMembership "),
            "uber *one membership"
        );
        assert_eq!(normalize_title("AJUSTE A CRÉDITO"), "ajuste a crédito");
        assert_eq!(normalize_title("   "), "");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_builtin_patterns_parse() {
        let builtin = builtin_mappings().unwrap();
        assert!(!builtin.is_empty());
        assert!(builtin
            .iter()
            .any(|m| m.title == "uber" && m.category == "Transportation"));
        assert!(builtin
            .iter()
            .any(|m| m.title == "spotify" && m.category == "Subscriptions"));
    }

    #[test]
    fn test_missing_file_loads_builtin_only() {
        let dir = TempDir::new().unwrap();

        let store = PatternStore::with_defaults(dir.path().join("categorized_titles.json"));
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), builtin_mappings().unwrap().len());
        assert!(entries.iter().all(|e| e.source == PatternSource::BuiltIn));

        let bare = store_in(&dir, false);
        assert!(bare.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_sorts_longest_first() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        write_file(
            &store,
            &[
                LearnedMapping::new("uber", "Transportation"),
                LearnedMapping::new("UBER *ONE   Membership", "Subscriptions"),
                LearnedMapping::new("uber eats", "Food & Dining"),
            ],
        );

        let entries = store.load().unwrap();
        let patterns: Vec<&str> = entries.iter().map(|e| e.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["uber *one membership", "uber eats", "uber"]);
    }

    #[test]
    fn test_learned_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, true);
        write_file(&store, &[LearnedMapping::new("Spotify", "Music")]);

        let entries = store.load().unwrap();
        let spotify: Vec<&PatternEntry> =
            entries.iter().filter(|e| e.pattern == "spotify").collect();
        assert_eq!(spotify.len(), 1);
        assert_eq!(spotify[0].category, "Music");
        assert_eq!(spotify[0].source, PatternSource::Learned);
    }

    #[test]
    fn test_duplicate_learned_entries_last_wins() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        write_file(
            &store,
            &[
                LearnedMapping::new("Padaria Central", "Groceries"),
                LearnedMapping::new("PADARIA  CENTRAL", "Food & Dining"),
            ],
        );

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Food & Dining");
    }

    #[test]
    fn test_blank_titles_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        write_file(
            &store,
            &[
                LearnedMapping::new("   ", "Everything"),
                LearnedMapping::new("netflix", "Subscriptions"),
            ],
        );

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pattern, "netflix");
    }

    #[test]
    fn test_load_is_cached_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        write_file(&store, &[LearnedMapping::new("netflix", "Subscriptions")]);

        assert!(!store.is_cached());
        assert_eq!(store.load().unwrap().len(), 1);
        assert!(store.is_cached());

        // External edit is not visible through the cache
        write_file(
            &store,
            &[
                LearnedMapping::new("netflix", "Subscriptions"),
                LearnedMapping::new("hulu", "Subscriptions"),
            ],
        );
        assert_eq!(store.load().unwrap().len(), 1);

        store.invalidate();
        assert!(!store.is_cached());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, true);
        fs::write(store.path(), "{ not json").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(Error::PatternStore(_))));

        // update refuses to overwrite a file it cannot read
        let result = store.update(&[LearnedMapping::new("netflix", "Subscriptions")]);
        assert!(matches!(result, Err(Error::PatternStore(_))));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_update_bootstraps_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        let written = store
            .update(&[LearnedMapping::new("PADARIA CENTRAL", "Groceries")])
            .unwrap();
        assert_eq!(written, 1);
        assert!(store.path().exists());
        assert_eq!(
            store.learned().unwrap(),
            vec![LearnedMapping::new("PADARIA CENTRAL", "Groceries")]
        );
    }

    #[test]
    fn test_update_replaces_by_normalized_title_and_sorts() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        write_file(
            &store,
            &[
                LearnedMapping::new("Zara Store", "Shopping"),
                LearnedMapping::new("UBER  TRIP", "Transportation"),
            ],
        );

        store
            .update(&[
                LearnedMapping::new("uber trip", "Work Travel"),
                LearnedMapping::new("Amazon Prime", "Subscriptions"),
            ])
            .unwrap();

        assert_eq!(
            store.learned().unwrap(),
            vec![
                LearnedMapping::new("Amazon Prime", "Subscriptions"),
                LearnedMapping::new("Zara Store", "Shopping"),
                LearnedMapping::new("uber trip", "Work Travel"),
            ]
        );
    }

    #[test]
    fn test_update_later_change_wins() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        store
            .update(&[
                LearnedMapping::new("CAFE DO PONTO", "Food & Dining"),
                LearnedMapping::new("cafe do ponto", "Groceries"),
            ])
            .unwrap();

        let learned = store.learned().unwrap();
        assert_eq!(
            learned,
            vec![LearnedMapping::new("cafe do ponto", "Groceries")]
        );
    }

    #[test]
    fn test_update_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        assert!(store.load().unwrap().is_empty());
        assert!(store.is_cached());

        store
            .update(&[LearnedMapping::new("netflix", "Subscriptions")])
            .unwrap();
        assert!(!store.is_cached());

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Subscriptions");
    }

    #[test]
    fn test_empty_update_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);

        assert_eq!(store.update(&[]).unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_blank_file_is_empty_set() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, false);
        fs::write(store.path(), "\n").unwrap();

        assert!(store.load().unwrap().is_empty());
    }
}
