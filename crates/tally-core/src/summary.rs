//! Aggregation: classify, group by category, total
//!
//! Bucket amounts and the grand total are always recomputed from the member
//! transactions after a structural change, never patched incrementally.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::error::Result;
use crate::models::{
    CategoryBucket, ChangeRequest, MatchSource, NewTransaction, Summary, Transaction,
};
use crate::money;

/// Result of applying a change set to a summary
#[derive(Debug, Clone)]
pub struct Rebuild {
    pub summary: Summary,
    /// Changes that moved a transaction
    pub applied: Vec<ChangeRequest>,
    /// Changes whose transaction was not found in the source category
    pub skipped: Vec<ChangeRequest>,
}

/// Classify rows and build the category summary
pub fn summarize(rows: &[NewTransaction], classifier: &Classifier<'_>) -> Result<Summary> {
    let mut transactions = Vec::with_capacity(rows.len());
    let mut by_source: HashMap<MatchSource, usize> = HashMap::new();

    for row in rows {
        let classification = classifier.explain(&row.title)?;
        *by_source.entry(classification.source).or_insert(0) += 1;
        transactions.push(row.clone().classify_as(classification.category));
    }

    let summary = Summary::from_transactions(transactions);

    let count = |source: MatchSource| by_source.get(&source).copied().unwrap_or(0);
    info!(
        "Summarized {} transactions into {} categories",
        rows.len(),
        summary.buckets.len()
    );
    debug!(
        "Match sources: learned={}, built_in={}, numeric_prefix={}, default={}",
        count(MatchSource::Learned),
        count(MatchSource::BuiltIn),
        count(MatchSource::NumericPrefix),
        count(MatchSource::Default),
    );

    Ok(summary)
}

impl Summary {
    /// Group classified transactions by category, keeping supply order
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut summary = Summary::default();

        for tx in transactions {
            match summary.bucket_mut(&tx.category) {
                Some(bucket) => bucket.transactions.push(tx),
                None => {
                    let mut bucket = CategoryBucket::empty(tx.category.clone());
                    bucket.transactions.push(tx);
                    summary.buckets.push(bucket);
                }
            }
        }

        summary.recompute();
        summary
    }

    /// Drop empty buckets and recompute every amount from the transactions
    pub fn recompute(&mut self) {
        self.buckets.retain(|b| !b.transactions.is_empty());

        for bucket in &mut self.buckets {
            bucket.amount = money::sum_all(bucket.transactions.iter().map(|t| t.amount));
        }

        self.total_amount = money::sum_all(self.buckets.iter().map(|b| b.amount));
    }

    /// Apply a change set to a copy of this summary
    ///
    /// Changes apply in order. Each moves the first transaction titled
    /// `transaction_title` out of `from_category` into `to_category` (created if
    /// needed). A change whose transaction is not found is skipped. Empty buckets
    /// are dropped and all amounts recomputed at the end.
    pub fn apply_changes(&self, changes: &[ChangeRequest]) -> Rebuild {
        let mut summary = self.clone();
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for change in changes {
            let Some(mut tx) = take_transaction(&mut summary, change) else {
                warn!(
                    "Skipping move of '{}': not found in '{}'",
                    change.transaction_title, change.from_category
                );
                skipped.push(change.clone());
                continue;
            };

            tx.category = change.to_category.clone();
            match summary.bucket_mut(&change.to_category) {
                Some(bucket) => bucket.transactions.push(tx),
                None => {
                    let mut bucket = CategoryBucket::empty(change.to_category.clone());
                    bucket.transactions.push(tx);
                    summary.buckets.push(bucket);
                }
            }
            applied.push(change.clone());
        }

        summary.recompute();

        Rebuild {
            summary,
            applied,
            skipped,
        }
    }
}

fn take_transaction(summary: &mut Summary, change: &ChangeRequest) -> Option<Transaction> {
    let bucket = summary.bucket_mut(&change.from_category)?;
    let position = bucket
        .transactions
        .iter()
        .position(|t| t.title == change.transaction_title)?;
    Some(bucket.transactions.remove(position))
}
