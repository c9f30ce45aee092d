//! Integration tests for tally-core
//!
//! These tests exercise the full import → summarize → review → re-summarize workflow.

use std::collections::VecDeque;
use std::fs;

use rust_decimal::Decimal;
use tally_core::{
    config::CategorySettings,
    export::{read_json, write_summary},
    import::parse_csv,
    review_until_settled, run_session, summarize, Classifier, ImportSettings, LearnedMapping,
    LineInput, PatternStore, Result, TuningOutcome,
};
use tempfile::TempDir;

/// Semicolon statement in the shape exported by the card issuer
fn statement_csv() -> &'static str {
    "date;title;amount\n\
     01/01;UBER TRIP 123;25,50\n\
     02/01;SPOTIFY;19,90\n\
     03/01;PAGAMENTO RECEBIDO;-500,00\n\
     04/01;PADARIA CENTRAL;8,75\n\
     05/01;123456 JOAO;40,00\n\
     \n\
     06/01;UBER TRIP 456;12,35\n"
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Minimal line input driven by a list of lines
struct Lines {
    lines: VecDeque<&'static str>,
    shown: Vec<String>,
    closed: usize,
}

impl Lines {
    fn new(lines: &[&'static str]) -> Self {
        Self {
            lines: lines.iter().copied().collect(),
            shown: Vec::new(),
            closed: 0,
        }
    }
}

impl LineInput for Lines {
    fn ask(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front().map(String::from))
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

#[test]
fn test_import_and_summarize() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(dir.path().join("categorized_titles.json"), true);
    let categories = CategorySettings::default();
    let classifier = Classifier::new(&store, &categories);

    let rows = parse_csv(statement_csv().as_bytes(), &ImportSettings::default()).unwrap();
    assert_eq!(rows.len(), 5, "header, blank line and credit are skipped");

    let summary = summarize(&rows, &classifier).unwrap();
    assert_eq!(
        summary.categories().join(", "),
        "Transportation, Subscriptions, Other, Personal Services"
    );
    assert_eq!(summary.bucket("Transportation").unwrap().amount, d("37.85"));
    assert_eq!(summary.bucket("Other").unwrap().amount, d("8.75"));
    assert_eq!(summary.total_amount, d("106.50"));

    // Writing the summary produces the documented JSON shape
    let out = dir.path().join("summary.json");
    write_summary(&out, &summary).unwrap();
    let value: serde_json::Value = read_json(&out).unwrap();
    assert_eq!(value["totalAmount"], serde_json::json!(106.5));
    assert_eq!(
        value["summarizedTransactions"]["Subscriptions"]["transactions"][0]["title"],
        "SPOTIFY"
    );
}

#[test]
fn test_review_teaches_future_runs() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("categorized_titles.json");
    let categories = CategorySettings::default();
    let rows = parse_csv(statement_csv().as_bytes(), &ImportSettings::default()).unwrap();

    {
        let store = PatternStore::new(&store_path, true);
        let classifier = Classifier::new(&store, &categories);
        let summary = summarize(&rows, &classifier).unwrap();

        // [3] is Other, holding PADARIA CENTRAL
        let mut input = Lines::new(&["3-1", "Groceries", ""]);
        let outcome = run_session(&summary, &store, &mut input).unwrap();

        let TuningOutcome::Updated(result) = outcome else {
            panic!("expected an updated summary");
        };
        let groceries = result.summary.bucket("Groceries").unwrap();
        assert_eq!(groceries.amount, d("8.75"));
        assert!(result.summary.bucket("Other").is_none());
        assert_eq!(result.summary.total_amount, summary.total_amount);
        assert_eq!(input.closed, 1);
    }

    let persisted: Vec<LearnedMapping> = read_json(&store_path).unwrap();
    assert_eq!(
        persisted,
        vec![LearnedMapping::new("PADARIA CENTRAL", "Groceries")]
    );

    // A fresh process sees the learned mapping
    let store = PatternStore::new(&store_path, true);
    let classifier = Classifier::new(&store, &categories);
    let summary = summarize(&rows, &classifier).unwrap();
    assert_eq!(summary.bucket("Groceries").unwrap().amount, d("8.75"));
    assert!(summary.bucket("Other").is_none());
}

#[test]
fn test_review_until_settled_with_fresh_inputs() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(dir.path().join("categorized_titles.json"), true);
    let categories = CategorySettings::default();
    let classifier = Classifier::new(&store, &categories);
    let rows = parse_csv(statement_csv().as_bytes(), &ImportSettings::default()).unwrap();
    let summary = summarize(&rows, &classifier).unwrap();

    let mut scripts = VecDeque::from(vec![
        Lines::new(&["1-2", "Work Travel", "4-1", "1", ""]),
        Lines::new(&[""]),
    ]);
    let mut opened = 0;

    let settled = review_until_settled(summary, &store, || {
        opened += 1;
        Ok(scripts.pop_front().unwrap_or_else(|| Lines::new(&[])))
    })
    .unwrap();

    assert_eq!(opened, 2);
    assert_eq!(settled.sessions, 2);
    assert_eq!(settled.changes_applied, 2);

    let transport = settled.summary.bucket("Transportation").unwrap();
    let titles: Vec<&str> = transport
        .transactions
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["UBER TRIP 123", "123456 JOAO"]);
    assert_eq!(transport.amount, d("65.50"));
    assert!(settled.summary.bucket("Personal Services").is_none());
    let work_travel = settled.summary.bucket("Work Travel").unwrap();
    assert_eq!(work_travel.amount, d("12.35"));
    assert_eq!(settled.summary.total_amount, d("106.50"));

    assert_eq!(
        store.learned().unwrap(),
        vec![
            LearnedMapping::new("123456 JOAO", "Transportation"),
            LearnedMapping::new("UBER TRIP 456", "Work Travel"),
        ]
    );
}

#[test]
fn test_corrupt_store_is_reported() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("categorized_titles.json");
    fs::write(&store_path, "[{\"title\": ").unwrap();

    let store = PatternStore::new(&store_path, true);
    let categories = CategorySettings::default();
    let classifier = Classifier::new(&store, &categories);
    let rows = parse_csv(statement_csv().as_bytes(), &ImportSettings::default()).unwrap();

    let err = summarize(&rows, &classifier).unwrap_err();
    assert!(
        err.to_string().contains("not a valid pattern file"),
        "{}",
        err
    );
}
