//! Title classifier
//!
//! Priority: longest matching pattern (learned or built-in) → numeric-prefix
//! fallback → default category. Every title gets a category; the only error is a
//! pattern store that cannot be read.

use tracing::debug;

use crate::config::CategorySettings;
use crate::error::Result;
use crate::models::{Classification, MatchSource};
use crate::patterns::{normalize_title, PatternStore};

/// Classifies transaction titles against a pattern store
pub struct Classifier<'a> {
    store: &'a PatternStore,
    categories: &'a CategorySettings,
}

impl<'a> Classifier<'a> {
    pub fn new(store: &'a PatternStore, categories: &'a CategorySettings) -> Self {
        Self { store, categories }
    }

    /// Category for a title
    pub fn classify(&self, title: &str) -> Result<String> {
        Ok(self.explain(title)?.category)
    }

    /// Category for a title, with the rule that produced it
    pub fn explain(&self, title: &str) -> Result<Classification> {
        let normalized = normalize_title(title);
        let entries = self.store.load()?;

        // Entries are sorted longest first, so the first hit is the most specific
        if !normalized.is_empty() {
            if let Some(entry) = entries.iter().find(|e| normalized.contains(&e.pattern)) {
                debug!(
                    "Pattern '{}' matched '{}': {} ({})",
                    entry.pattern, title, entry.category, entry.source
                );
                return Ok(Classification {
                    category: entry.category.clone(),
                    source: entry.source.into(),
                    pattern: Some(entry.pattern.clone()),
                });
            }
        }

        if normalized.starts_with(|c: char| c.is_ascii_digit()) {
            debug!(
                "Numeric prefix fallback for '{}': {}",
                title, self.categories.numeric_prefix
            );
            return Ok(Classification {
                category: self.categories.numeric_prefix.clone(),
                source: MatchSource::NumericPrefix,
                pattern: None,
            });
        }

        debug!(
            "Falling back to '{}' for '{}'",
            self.categories.default, title
        );
        Ok(Classification {
            category: self.categories.default.clone(),
            source: MatchSource::Default,
            pattern: None,
        })
    }
}
