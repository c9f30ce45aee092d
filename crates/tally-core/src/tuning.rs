//! Interactive review ("tuning") session
//!
//! A session shows the current summary as a numbered list of categories, each with
//! its numbered transaction titles, and accepts moves:
//!
//! ```text
//! Reviewing ──"2-3"──▶ AwaitingTarget ──"1" / "Groceries"──▶ Reviewing
//!     │                      └──invalid──▶ Reviewing
//!     ├──""  (no changes)──▶ NoChange
//!     └──""  (changes)─────▶ Finalizing ──▶ rebuilt summary + learned patterns
//! ```
//!
//! Numbers are display indexes derived from the summary the session was opened
//! with. The display is not rebuilt after individual moves; changes are recorded by
//! category name and title and applied together at finalize time against a fresh
//! copy of that summary.
//!
//! [`TuningSession`] is the pure state machine; [`run_session`] drives it with a
//! [`LineInput`].

use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{ChangeRequest, LearnedMapping, Summary};
use crate::patterns::PatternStore;

/// Prompt shown while waiting for a move command
pub const MOVE_PROMPT: &str =
    "\nEnter category-transaction to change (e.g., '1-5'), 'p' to preview, or press Enter to finish: ";

/// Line-oriented input capability used by review sessions
pub trait LineInput {
    /// Show `prompt` and block until a line is available. `None` means the input
    /// was closed.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Show a message to the user
    fn show(&mut self, text: &str);

    /// Release the input; called once when a session ends
    fn close(&mut self);
}

/// Closes the wrapped input when dropped, whichever way the session ends
struct InputGuard<'a, I: LineInput + ?Sized> {
    input: &'a mut I,
}

impl<'a, I: LineInput + ?Sized> InputGuard<'a, I> {
    fn new(input: &'a mut I) -> Self {
        Self { input }
    }
}

impl<I: LineInput + ?Sized> Deref for InputGuard<'_, I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.input
    }
}

impl<I: LineInput + ?Sized> DerefMut for InputGuard<'_, I> {
    fn deref_mut(&mut self) -> &mut I {
        self.input
    }
}

impl<I: LineInput + ?Sized> Drop for InputGuard<'_, I> {
    fn drop(&mut self) {
        self.input.close();
    }
}

/// A rejected command; the message is shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Invalid format. Please use 'category-transaction' format (e.g., '1-5').")]
    InvalidFormat,

    #[error("Category {0} does not exist.")]
    UnknownCategory(String),

    #[error("Transaction index {index} is out of range for category {category} (1-{count}).")]
    TransactionOutOfRange {
        category: usize,
        index: String,
        count: usize,
    },

    #[error("Invalid category number {0}.")]
    UnknownTarget(String),

    #[error("Transaction is already in that category.")]
    SameCategory,

    #[error("Category name cannot be empty.")]
    EmptyCategoryName,
}

/// One numbered category as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCategory {
    pub name: String,
    pub amount: Decimal,
    pub titles: Vec<String>,
}

/// Build the numbered display for a summary (non-empty buckets only)
pub fn display_categories(summary: &Summary) -> Vec<DisplayCategory> {
    summary
        .buckets
        .iter()
        .filter(|b| !b.transactions.is_empty())
        .map(|b| DisplayCategory {
            name: b.category.clone(),
            amount: b.amount,
            titles: b.transactions.iter().map(|t| t.title.clone()).collect(),
        })
        .collect()
}

/// Render a numbered display (1-based numbers)
pub fn render_categories(categories: &[DisplayCategory]) -> String {
    let mut out = String::new();
    for (i, category) in categories.iter().enumerate() {
        out.push_str(&format!(
            "[{}] - {} ({:.2})\n",
            i + 1,
            category.name,
            category.amount
        ));
        for (j, title) in category.titles.iter().enumerate() {
            out.push_str(&format!("    [{}] - {}\n", j + 1, title));
        }
    }
    out
}

/// Bulleted listing for previews, where numbers would not match the commands
fn render_unnumbered(categories: &[DisplayCategory]) -> String {
    let mut out = String::new();
    for category in categories {
        out.push_str(&format!("- {} ({:.2})\n", category.name, category.amount));
        for title in &category.titles {
            out.push_str(&format!("    - {}\n", title));
        }
    }
    out
}

/// The transaction picked by a move command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    /// 1-based display number of the category
    pub category_number: usize,
    /// 1-based display number of the transaction within the category
    pub transaction_number: usize,
    pub category: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a move command or the finish input
    Reviewing,
    /// A transaction is selected; waiting for the target category
    AwaitingTarget(SourceSelection),
    /// Finished with changes to apply
    Finalizing,
    /// Finished without changes
    NoChange,
}

impl SessionState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finalizing | Self::NoChange)
    }
}

/// Response to one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Input rejected; state is back to `Reviewing`
    Rejected(CommandError),
    /// Move source accepted; the next line names the target
    SourceSelected(SourceSelection),
    /// Move recorded
    Recorded(ChangeRequest),
    /// Rendering of the summary the pending changes would produce
    Preview(String),
    /// Session finished (see `state()` for which way)
    Finished,
}

/// Result of a session that changed something
#[derive(Debug, Clone)]
pub struct TuningResult {
    pub summary: Summary,
    pub applied: Vec<ChangeRequest>,
    pub skipped: Vec<ChangeRequest>,
    /// Mappings written to the pattern store
    pub learned: usize,
}

#[derive(Debug, Clone)]
pub enum TuningOutcome {
    NoChange,
    Updated(TuningResult),
}

/// Review state machine over one summary
#[derive(Debug, Clone)]
pub struct TuningSession {
    original: Summary,
    display: Vec<DisplayCategory>,
    changes: Vec<ChangeRequest>,
    state: SessionState,
}

impl TuningSession {
    pub fn new(summary: &Summary) -> Self {
        Self {
            display: display_categories(summary),
            original: summary.clone(),
            changes: Vec::new(),
            state: SessionState::Reviewing,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Changes recorded so far, in application order
    pub fn changes(&self) -> &[ChangeRequest] {
        &self.changes
    }

    pub fn display(&self) -> &[DisplayCategory] {
        &self.display
    }

    /// The numbered category list shown at the start of the session
    pub fn render(&self) -> String {
        format!(
            "\nReview the identified categories:\n\n{}\nTotal: {:.2}\n",
            render_categories(&self.display),
            self.original.total_amount
        )
    }

    /// Prompt for the next line in the current state
    pub fn prompt(&self) -> String {
        match &self.state {
            SessionState::AwaitingTarget(selection) => format!(
                "Move transaction \"{}\" to which category? (number, or a new category name): ",
                selection.title
            ),
            _ => MOVE_PROMPT.to_string(),
        }
    }

    /// What the summary would look like with the pending changes applied
    pub fn preview(&self) -> String {
        let rebuilt = self.original.apply_changes(&self.changes).summary;
        format!(
            "\nPreview with {} pending change(s):\n\n{}\nTotal: {:.2}\n\
             Move commands still use the original numbered list.\n",
            self.changes.len(),
            render_unnumbered(&display_categories(&rebuilt)),
            rebuilt.total_amount
        )
    }

    /// Feed one line of input to the state machine
    pub fn handle_line(&mut self, line: &str) -> Reply {
        let state = std::mem::replace(&mut self.state, SessionState::Reviewing);
        match state {
            SessionState::Reviewing => self.handle_command(line.trim()),
            SessionState::AwaitingTarget(selection) => self.handle_target(selection, line.trim()),
            finished => {
                self.state = finished;
                Reply::Finished
            }
        }
    }

    fn handle_command(&mut self, input: &str) -> Reply {
        if input.is_empty() {
            self.state = if self.changes.is_empty() {
                SessionState::NoChange
            } else {
                SessionState::Finalizing
            };
            return Reply::Finished;
        }

        if input.eq_ignore_ascii_case("p") {
            return Reply::Preview(self.preview());
        }

        match self.select_source(input) {
            Ok(selection) => {
                debug!(
                    "Selected '{}' in '{}' ({}-{})",
                    selection.title,
                    selection.category,
                    selection.category_number,
                    selection.transaction_number
                );
                self.state = SessionState::AwaitingTarget(selection.clone());
                Reply::SourceSelected(selection)
            }
            Err(e) => Reply::Rejected(e),
        }
    }

    fn select_source(&self, input: &str) -> std::result::Result<SourceSelection, CommandError> {
        let captures = move_command_re()
            .captures(input)
            .ok_or(CommandError::InvalidFormat)?;
        let category_raw = &captures[1];
        let index_raw = &captures[2];

        let category_number = category_raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1 && *n <= self.display.len())
            .ok_or_else(|| CommandError::UnknownCategory(category_raw.to_string()))?;
        let category = &self.display[category_number - 1];

        let transaction_number = index_raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1 && *n <= category.titles.len())
            .ok_or_else(|| CommandError::TransactionOutOfRange {
                category: category_number,
                index: index_raw.to_string(),
                count: category.titles.len(),
            })?;

        Ok(SourceSelection {
            category_number,
            transaction_number,
            category: category.name.clone(),
            title: category.titles[transaction_number - 1].clone(),
        })
    }

    fn handle_target(&mut self, selection: SourceSelection, input: &str) -> Reply {
        match self.resolve_target(&selection, input) {
            Ok(target) => {
                let change = ChangeRequest::new(selection.category, target, selection.title);
                debug!(
                    "Recorded move of '{}' from '{}' to '{}'",
                    change.transaction_title, change.from_category, change.to_category
                );
                self.changes.push(change.clone());
                Reply::Recorded(change)
            }
            Err(e) => Reply::Rejected(e),
        }
    }

    fn resolve_target(
        &self,
        selection: &SourceSelection,
        input: &str,
    ) -> std::result::Result<String, CommandError> {
        if input.is_empty() {
            return Err(CommandError::EmptyCategoryName);
        }

        if input.bytes().all(|b| b.is_ascii_digit()) {
            let number = input
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1 && *n <= self.display.len())
                .ok_or_else(|| CommandError::UnknownTarget(input.to_string()))?;
            if number == selection.category_number {
                return Err(CommandError::SameCategory);
            }
            return Ok(self.display[number - 1].name.clone());
        }

        // Free text: an existing category name is reused as-is, anything else is new
        if input == selection.category {
            return Err(CommandError::SameCategory);
        }
        Ok(input.to_string())
    }

    /// Apply the recorded changes and teach the pattern store
    ///
    /// Returns `NoChange` when nothing was recorded. Otherwise the changes are
    /// applied to a fresh copy of the original summary and the applied
    /// `{title, category}` pairs are written to the store before returning.
    pub fn finalize(self, store: &PatternStore) -> Result<TuningOutcome> {
        if self.changes.is_empty() {
            return Ok(TuningOutcome::NoChange);
        }

        let rebuild = self.original.apply_changes(&self.changes);
        let mappings: Vec<LearnedMapping> = rebuild
            .applied
            .iter()
            .map(ChangeRequest::learned_mapping)
            .collect();
        let learned = store.update(&mappings)?;

        info!(
            "Review finished: {} applied, {} skipped, {} mappings learned",
            rebuild.applied.len(),
            rebuild.skipped.len(),
            learned
        );

        Ok(TuningOutcome::Updated(TuningResult {
            summary: rebuild.summary,
            applied: rebuild.applied,
            skipped: rebuild.skipped,
            learned,
        }))
    }
}

fn move_command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)-(\d+)$").expect("move command pattern is valid"))
}

/// Run one review session over `summary`
///
/// The input is closed when the session ends, including on error.
pub fn run_session<I: LineInput + ?Sized>(
    summary: &Summary,
    store: &PatternStore,
    input: &mut I,
) -> Result<TuningOutcome> {
    let mut input = InputGuard::new(input);
    let mut session = TuningSession::new(summary);

    input.show(&session.render());

    while !session.state().is_finished() {
        let prompt = session.prompt();
        let line = match input.ask(&prompt)? {
            Some(line) => line,
            None => {
                debug!("Input closed, treating as finish");
                String::new()
            }
        };

        match session.handle_line(&line) {
            Reply::Rejected(e) => input.show(&e.to_string()),
            Reply::SourceSelected(_) | Reply::Finished => {}
            Reply::Recorded(change) => input.show(&format!(
                "OK: \"{}\" will move from {} to {}",
                change.transaction_title, change.from_category, change.to_category
            )),
            Reply::Preview(text) => input.show(&text),
        }
    }

    let outcome = session.finalize(store)?;

    if let TuningOutcome::Updated(result) = &outcome {
        input.show(&format!(
            "\nUpdated categories:\n\n{}\nTotal: {:.2}\n",
            render_categories(&display_categories(&result.summary)),
            result.summary.total_amount
        ));
        if !result.skipped.is_empty() {
            input.show(&format!(
                "{} change(s) could not be applied (transaction not found).",
                result.skipped.len()
            ));
        }
    }

    Ok(outcome)
}

/// Final state of a series of review sessions
#[derive(Debug, Clone)]
pub struct Settled {
    pub summary: Summary,
    /// Number of sessions run (the last one ended without changes)
    pub sessions: usize,
    pub changes_applied: usize,
}

/// Run review sessions until one ends without changes
///
/// `open_input` acquires a fresh input for each session; each is closed when its
/// session ends.
pub fn review_until_settled<F, I>(
    summary: Summary,
    store: &PatternStore,
    mut open_input: F,
) -> Result<Settled>
where
    F: FnMut() -> Result<I>,
    I: LineInput,
{
    let mut current = summary;
    let mut sessions = 0;
    let mut changes_applied = 0;

    loop {
        let mut input = open_input()?;
        sessions += 1;

        match run_session(&current, store, &mut input)? {
            TuningOutcome::NoChange => break,
            TuningOutcome::Updated(result) => {
                changes_applied += result.applied.len();
                current = result.summary;
            }
        }
    }

    Ok(Settled {
        summary: current,
        sessions,
        changes_applied,
    })
}
