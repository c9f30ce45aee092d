//! Summarize command: import, classify, review, write

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{
    export, import, review_until_settled, summarize, Classifier, LineInput, PatternStore,
    Settings, Summary,
};

use super::{truncate, TerminalInput};

pub fn cmd_summarize(
    settings: &Settings,
    store: &PatternStore,
    file: &Path,
    output: &Path,
    no_review: bool,
) -> Result<()> {
    if no_review {
        run_summarize(
            settings,
            store,
            file,
            output,
            None::<fn() -> tally_core::Result<TerminalInput>>,
        )
    } else {
        run_summarize(settings, store, file, output, Some(TerminalInput::open))
    }
}

/// Summarize `file`, optionally review it with inputs from `open_input`, and write
/// the result to `output`
pub fn run_summarize<F, I>(
    settings: &Settings,
    store: &PatternStore,
    file: &Path,
    output: &Path,
    open_input: Option<F>,
) -> Result<()>
where
    F: FnMut() -> tally_core::Result<I>,
    I: LineInput,
{
    let rows = import::parse_file(file, &settings.import)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let classifier = Classifier::new(store, &settings.categories);
    let mut summary = summarize(&rows, &classifier).context("Failed to summarize")?;

    if let Some(open_input) = open_input {
        let settled =
            review_until_settled(summary, store, open_input).context("Review session failed")?;
        if settled.changes_applied > 0 {
            println!(
                "✏️  Applied {} change(s) over {} session(s)",
                settled.changes_applied, settled.sessions
            );
        }
        summary = settled.summary;
    }

    print_summary(&summary);

    export::write_summary(output, &summary)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("✅ Summary written to {}", output.display());

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    println!("📊 Spending by category");
    println!("   ─────────────────────────────────────────────────────────────");

    for bucket in &summary.buckets {
        println!(
            "   {:<32} {:>12.2}  ({} transactions)",
            truncate(&bucket.category, 32),
            bucket.amount,
            bucket.transactions.len()
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:<32} {:>12.2}", "Total", summary.total_amount);
    println!();
}
