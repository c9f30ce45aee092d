//! Bootstrap the learned pattern store from a statement
//!
//! Every distinct title is classified with the current rules and written back as a
//! learned mapping, giving the user a concrete file to hand-edit.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::info;

use crate::classifier::Classifier;
use crate::config::CATEGORIES_FILE_NAME;
use crate::error::Result;
use crate::export;
use crate::models::LearnedMapping;
use crate::patterns::{normalize_title, PatternStore};

/// What a seeding run wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Distinct titles written
    pub titles: usize,
    /// Distinct categories assigned, sorted
    pub categories: Vec<String>,
    /// Sorted list of every category in the store, written next to it
    pub categories_file: Option<PathBuf>,
}

/// Classify each distinct title and persist the results as learned mappings
///
/// Titles are deduplicated by normalized form; the first spelling seen is kept.
/// Blank titles are ignored. Unless nothing was seeded, the sorted category list
/// of the whole store is also written to `categories.json` beside the store.
pub fn seed_from_titles<'t, I>(
    titles: I,
    classifier: &Classifier<'_>,
    store: &PatternStore,
) -> Result<SeedReport>
where
    I: IntoIterator<Item = &'t str>,
{
    let mut seen = BTreeSet::new();
    let mut mappings = Vec::new();
    let mut categories = BTreeSet::new();

    for title in titles {
        let title = title.trim();
        let key = normalize_title(title);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        let category = classifier.classify(title)?;
        categories.insert(category.clone());
        mappings.push(LearnedMapping::new(title, category));
    }

    let titles = store.update(&mappings)?;
    info!(
        "Seeded {} titles across {} categories",
        titles,
        categories.len()
    );

    let categories_file = if mappings.is_empty() {
        None
    } else {
        let path = store.path().with_file_name(CATEGORIES_FILE_NAME);
        let all: BTreeSet<String> = store
            .learned()?
            .into_iter()
            .map(|mapping| mapping.category)
            .collect();
        export::write_json(&path, &all)?;
        info!("Wrote {} categories to {}", all.len(), path.display());
        Some(path)
    };

    Ok(SeedReport {
        titles,
        categories: categories.into_iter().collect(),
        categories_file,
    })
}
