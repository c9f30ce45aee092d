//! CSV statement import
//!
//! Statements have three leading columns: `date`, `title`, `amount`. Extra columns are
//! ignored. The delimiter is either configured or detected from the first line.

use std::fs;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::ImportSettings;
use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Expected column names, in order
pub const COLUMNS: [&str; 3] = ["date", "title", "amount"];

/// Parse a statement file
pub fn parse_file(path: &Path, settings: &ImportSettings) -> Result<Vec<NewTransaction>> {
    let file = fs::File::open(path)
        .map_err(|e| Error::Import(format!("Failed to open {}: {}", path.display(), e)))?;
    let rows = parse_csv(file, settings)?;
    info!("Imported {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse statement rows from CSV data
pub fn parse_csv<R: Read>(
    mut reader: R,
    settings: &ImportSettings,
) -> Result<Vec<NewTransaction>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let delimiter = settings
        .delimiter
        .unwrap_or_else(|| detect_delimiter(content));
    debug!("Parsing CSV with delimiter '{}'", delimiter as char);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut credits = 0;

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if is_blank(&record) || is_header(&record) {
            continue;
        }

        let row = parse_row(&record, line)?;
        if settings.skip_credits && row.amount.is_sign_negative() {
            credits += 1;
            continue;
        }
        rows.push(row);
    }

    if credits > 0 {
        debug!("Skipped {} credit rows", credits);
    }

    Ok(rows)
}

/// `;` when the first non-blank line contains one, `,` otherwise
pub fn detect_delimiter(content: &str) -> u8 {
    let first = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    if first.contains(';') {
        b';'
    } else {
        b','
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.is_empty())
}

/// A row whose leading non-empty cells are all column names
fn is_header(record: &StringRecord) -> bool {
    let mut cells = record
        .iter()
        .take(COLUMNS.len())
        .filter(|c| !c.is_empty())
        .peekable();
    cells.peek().is_some()
        && cells.all(|c| COLUMNS.iter().any(|name| c.eq_ignore_ascii_case(name)))
}

fn parse_row(record: &StringRecord, line: u64) -> Result<NewTransaction> {
    let date = record.get(0).unwrap_or("");

    let title = record.get(1).unwrap_or("");
    if title.is_empty() {
        return Err(Error::Import(format!("line {}: missing title", line)));
    }

    let raw_amount = record.get(2).unwrap_or("");
    let amount = parse_amount(raw_amount)
        .ok_or_else(|| Error::Import(format!("line {}: invalid amount '{}'", line, raw_amount)))?;

    NewTransaction::new(date, title, amount)
}

/// Parse an amount string, handling currency symbols, separators and negatives
///
/// Accepts `1234.56`, `1,234.56`, `1.234,56`, `25,50`, `R$ 19,90`, `-5.00` and
/// `(5.00)`. When both separators appear the last one is the decimal point; a single
/// separator character is a decimal point when it occurs once and thousands grouping
/// when repeated.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let negative = (s.starts_with('(') && s.ends_with(')')) || s.contains('-');

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value: Decimal = normalize_separators(&cleaned).parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Rewrite digits and separators into `1234.56` form
fn normalize_separators(s: &str) -> String {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let decimal_at = match (commas, dots) {
        (0, 0) => None,
        (c, d) if c > 0 && d > 0 => s.rfind(',').max(s.rfind('.')),
        (1, 0) => s.find(','),
        (0, 1) => s.find('.'),
        _ => None,
    };

    s.char_indices()
        .filter_map(|(i, c)| {
            if c.is_ascii_digit() {
                Some(c)
            } else if Some(i) == decimal_at {
                Some('.')
            } else {
                None
            }
        })
        .collect()
}
