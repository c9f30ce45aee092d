//! Tally Core Library
//!
//! Shared functionality for the Tally spending summarizer:
//! - CSV statement import
//! - Title classification against learned and built-in patterns
//! - Cent-exact category summaries
//! - Interactive review sessions that move transactions and learn from the moves
//! - JSON persistence for the pattern store and summary artifact
//! - Layered settings

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod money;
pub mod patterns;
pub mod seed;
pub mod summary;
pub mod tuning;

/// Test utilities including a scripted line input
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classifier::Classifier;
pub use config::{CategorySettings, ImportSettings, Settings, StoreSettings};
pub use error::{Error, Result};
pub use models::{
    CategoryBucket, ChangeRequest, Classification, LearnedMapping, MatchSource, NewTransaction,
    PatternEntry, PatternSource, Summary, Transaction,
};
pub use patterns::PatternStore;
pub use seed::{seed_from_titles, SeedReport};
pub use summary::{summarize, Rebuild};
pub use tuning::{
    review_until_settled, run_session, CommandError, LineInput, Settled, TuningOutcome,
    TuningResult, TuningSession,
};
