//! Pattern command implementations (classify, list, learn)

use anyhow::{bail, Context, Result};
use tally_core::{Classifier, LearnedMapping, PatternStore, Settings};

use super::truncate;

pub fn cmd_classify(settings: &Settings, store: &PatternStore, title: &str) -> Result<()> {
    let classifier = Classifier::new(store, &settings.categories);
    let result = classifier
        .explain(title)
        .context("Failed to load patterns")?;

    println!();
    println!("🔍 \"{}\"", title);
    println!("   Category: {}", result.category);
    match &result.pattern {
        Some(pattern) => println!("   Rule:     {} pattern \"{}\"", result.source, pattern),
        None => println!("   Rule:     {} fallback", result.source),
    }

    Ok(())
}

pub fn cmd_patterns_list(store: &PatternStore) -> Result<()> {
    let entries = store.load().context("Failed to load patterns")?;

    if entries.is_empty() {
        println!("No patterns found. Run 'tally seed --file statement.csv' to create some.");
        return Ok(());
    }

    println!();
    println!("📋 Patterns ({}), longest first", entries.len());
    println!("   Store: {}", store.path().display());
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in entries.iter() {
        println!(
            "   {:<40} {:<24} [{}]",
            truncate(&entry.pattern, 40),
            truncate(&entry.category, 24),
            entry.source
        );
    }

    Ok(())
}

pub fn cmd_patterns_learn(store: &PatternStore, title: &str, category: &str) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Title cannot be empty");
    }
    if category.trim().is_empty() {
        bail!("Category cannot be empty");
    }

    store
        .update(&[LearnedMapping::new(title, category)])
        .context("Failed to update pattern store")?;

    println!("✅ \"{}\" → {}", title.trim(), category.trim());
    Ok(())
}
