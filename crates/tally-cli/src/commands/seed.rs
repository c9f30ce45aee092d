//! Seed command: bootstrap the learned pattern file from a statement

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{import, seed_from_titles, Classifier, ImportSettings, PatternStore, Settings};

pub fn cmd_seed(settings: &Settings, store: &PatternStore, file: &Path) -> Result<()> {
    // Every title is seeded, credits included
    let import_settings = ImportSettings {
        skip_credits: false,
        ..settings.import.clone()
    };
    let rows = import::parse_file(file, &import_settings)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let classifier = Classifier::new(store, &settings.categories);
    let titles = rows.iter().map(|row| row.title.as_str());
    let report =
        seed_from_titles(titles, &classifier, store).context("Failed to seed pattern store")?;

    println!(
        "🌱 Seeded {} titles into {}",
        report.titles,
        store.path().display()
    );
    if !report.categories.is_empty() {
        println!("   Categories: {}", report.categories.join(", "));
    }
    if let Some(path) = &report.categories_file {
        println!("   Category list written to {}", path.display());
    }

    Ok(())
}
