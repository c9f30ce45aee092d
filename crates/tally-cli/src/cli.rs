//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Summarize card spending by category
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Summarize card spending by category", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Learned pattern file (overrides the `store.path` setting)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Settings file (defaults to <data dir>/tally/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a statement by category, then review the result
    Summarize {
        /// CSV statement (date, title, amount)
        #[arg(short, long)]
        file: PathBuf,

        /// Where to write the summary JSON
        #[arg(short, long, default_value = "summary.json")]
        output: PathBuf,

        /// Skip the interactive review
        #[arg(long)]
        no_review: bool,
    },

    /// Show the category a title would get and which rule produced it
    Classify {
        /// Transaction title
        title: String,
    },

    /// Manage learned patterns
    Patterns {
        #[command(subcommand)]
        action: Option<PatternsAction>,
    },

    /// Bootstrap the learned pattern file from a statement
    Seed {
        /// CSV statement (date, title, amount)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum PatternsAction {
    /// List effective patterns in match order
    List,

    /// Add or replace a learned mapping
    Learn {
        /// Title (matched case-insensitively as a substring)
        title: String,

        /// Category to assign
        category: String,
    },
}
