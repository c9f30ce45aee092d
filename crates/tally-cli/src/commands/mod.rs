//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_settings, open_store)
//! - `patterns` - Pattern commands (classify, list, learn)
//! - `seed` - Bootstrap the learned pattern file
//! - `summarize` - Summarize a statement and run review sessions
//! - `terminal` - Stdin/stdout line input for review sessions

pub mod core;
pub mod patterns;
pub mod seed;
pub mod summarize;
pub mod terminal;

// Re-export command functions for main.rs
pub use core::*;
pub use patterns::*;
pub use seed::*;
pub use summarize::*;
pub use terminal::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
