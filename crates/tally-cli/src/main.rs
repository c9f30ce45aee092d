//! Tally CLI - Spending summarizer
//!
//! Usage:
//!   tally summarize --file CSV      Summarize and review a statement
//!   tally classify "UBER TRIP"      Explain how a title is categorized
//!   tally patterns list             List effective patterns
//!   tally seed --file CSV           Bootstrap the learned pattern file

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr; stdout belongs to the review session
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let settings = commands::load_settings(cli.config.as_deref())?;
    let store = commands::open_store(&settings, cli.store.as_deref());

    match cli.command {
        Commands::Summarize {
            file,
            output,
            no_review,
        } => commands::cmd_summarize(&settings, &store, &file, &output, no_review),
        Commands::Classify { title } => commands::cmd_classify(&settings, &store, &title),
        Commands::Patterns { action } => match action {
            None | Some(PatternsAction::List) => commands::cmd_patterns_list(&store),
            Some(PatternsAction::Learn { title, category }) => {
                commands::cmd_patterns_learn(&store, &title, &category)
            }
        },
        Commands::Seed { file } => commands::cmd_seed(&settings, &store, &file),
    }
}
