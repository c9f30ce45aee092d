//! JSON persistence helpers
//!
//! Files are written as pretty JSON (two-space indent, struct field order, trailing
//! newline) so they stay hand-editable and diff cleanly under version control.
//! Writes go through a temp file in the target directory and are moved into place,
//! so a failed write never leaves a truncated file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Summary;

/// Serialize `value` as pretty JSON and atomically replace `path`
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(json.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the summary artifact
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    write_json(path, summary)?;
    info!(
        "Wrote summary ({} categories, {} transactions) to {}",
        summary.buckets.len(),
        summary.transaction_count(),
        path.display()
    );
    Ok(())
}
