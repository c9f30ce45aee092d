//! Domain models for Tally

use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A statement row that has not been classified yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: String,
    pub title: String,
    pub amount: Decimal,
}

impl NewTransaction {
    /// Build a row, trimming `date` and `title`. The title is required.
    pub fn new(date: impl Into<String>, title: impl Into<String>, amount: Decimal) -> Result<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidData("transaction title is empty".into()));
        }

        Ok(Self {
            date: date.into().trim().to_string(),
            title,
            amount,
        })
    }

    /// Attach a category, producing a classified transaction
    pub fn classify_as(self, category: impl Into<String>) -> Transaction {
        Transaction {
            date: self.date,
            title: self.title,
            category: category.into(),
            amount: self.amount,
        }
    }
}

/// A classified transaction
///
/// Only `category` changes after classification (when a review session moves it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub title: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// All transactions currently assigned to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    /// Cent sum of `transactions[].amount`, recomputed after structural changes
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transactions: Vec<Transaction>,
}

impl CategoryBucket {
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }
}

/// Category-grouped view of a set of transactions
///
/// Buckets keep first-appearance order so that display numbering is stable for a
/// given input. Serialized as
/// `{"totalAmount": .., "summarizedTransactions": {"<category>": bucket, ..}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_amount: Decimal,
    pub buckets: Vec<CategoryBucket>,
}

impl Summary {
    /// Look up a bucket by category name
    pub fn bucket(&self, category: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.category == category)
    }

    pub(crate) fn bucket_mut(&mut self, category: &str) -> Option<&mut CategoryBucket> {
        self.buckets.iter_mut().find(|b| b.category == category)
    }

    /// Number of transactions across all buckets
    pub fn transaction_count(&self) -> usize {
        self.buckets.iter().map(|b| b.transactions.len()).sum()
    }

    /// Category names in bucket order
    pub fn categories(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.category.as_str()).collect()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Repr<'a> {
            #[serde(with = "rust_decimal::serde::float")]
            total_amount: Decimal,
            summarized_transactions: BucketMap<'a>,
        }

        Repr {
            total_amount: self.total_amount,
            summarized_transactions: BucketMap(&self.buckets),
        }
        .serialize(serializer)
    }
}

/// Serializes buckets as a JSON object keyed by category
struct BucketMap<'a>(&'a [CategoryBucket]);

impl Serialize for BucketMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in self.0 {
            map.serialize_entry(&bucket.category, bucket)?;
        }
        map.end()
    }
}

/// Where a pattern entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternSource {
    /// Persisted by the user (review sessions, `patterns learn`, `seed`)
    Learned,
    /// Embedded default rules
    BuiltIn,
}

impl PatternSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::BuiltIn => "built-in",
        }
    }
}

impl std::fmt::Display for PatternSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized title substring mapped to a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: String,
    pub category: String,
    pub source: PatternSource,
}

/// A title → category mapping as persisted in the pattern file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedMapping {
    pub title: String,
    pub category: String,
}

impl LearnedMapping {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
        }
    }
}

/// One user-directed move, recorded by category names (display numbers shift)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub from_category: String,
    pub to_category: String,
    pub transaction_title: String,
}

impl ChangeRequest {
    pub fn new(
        from_category: impl Into<String>,
        to_category: impl Into<String>,
        transaction_title: impl Into<String>,
    ) -> Self {
        Self {
            from_category: from_category.into(),
            to_category: to_category.into(),
            transaction_title: transaction_title.into(),
        }
    }

    /// The mapping this change teaches the pattern store
    pub fn learned_mapping(&self) -> LearnedMapping {
        LearnedMapping::new(&self.transaction_title, &self.to_category)
    }
}

/// Which rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    /// A learned pattern matched
    Learned,
    /// A built-in pattern matched
    BuiltIn,
    /// No pattern matched; the title starts with a digit
    NumericPrefix,
    /// No pattern matched
    Default,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::BuiltIn => "built-in",
            Self::NumericPrefix => "numeric-prefix",
            Self::Default => "default",
        }
    }

    /// Whether the category came from a pattern rather than a fallback
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Learned | Self::BuiltIn)
    }
}

impl From<PatternSource> for MatchSource {
    fn from(source: PatternSource) -> Self {
        match source {
            PatternSource::Learned => Self::Learned,
            PatternSource::BuiltIn => Self::BuiltIn,
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detailed classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub source: MatchSource,
    /// The pattern that matched (pattern sources only)
    pub pattern: Option<String>,
}
