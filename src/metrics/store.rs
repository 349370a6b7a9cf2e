//! Append-only JSON history of run metrics
//!
//! The file on disk is always a JSON array. Older deployments wrote a single
//! object; that shape is normalized into a one-element array on load. Records
//! already in the file are kept as raw JSON so that fields this version does
//! not know about survive a rewrite.

use crate::error::RelayError;
use crate::types::MetricsRecord;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default history file name
pub const DEFAULT_METRICS_FILE: &str = "metrics.json";

/// File-backed metrics history
#[derive(Debug, Clone)]
pub struct MetricsStore {
    path: PathBuf,
}

impl MetricsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and normalize the history; a missing file is an empty history
    ///
    /// Unparseable content is a [`RelayError::CorruptMetricsStore`] and the
    /// file is left as is.
    pub fn load_history(&self) -> Result<Vec<Value>, RelayError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| RelayError::CorruptMetricsStore {
                path: self.path.clone(),
                source,
            })?;

        Ok(normalize_history(value))
    }

    /// Number of records currently stored
    pub fn len(&self) -> Result<usize, RelayError> {
        Ok(self.load_history()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RelayError> {
        Ok(self.len()? == 0)
    }

    /// Append one record and persist the whole history
    ///
    /// Returns the number of records after the append.
    pub fn append(&self, record: &MetricsRecord) -> Result<usize, RelayError> {
        let mut history = self.load_history()?;
        history.push(serde_json::to_value(record)?);

        let json = serde_json::to_string_pretty(&history)?;
        write_atomic(&self.path, &json)?;

        tracing::debug!(
            path = %self.path.display(),
            records = history.len(),
            "appended metrics record"
        );
        Ok(history.len())
    }
}

/// Normalize a loaded value into a history sequence
///
/// Arrays pass through unchanged; any other value becomes the sole element.
pub fn normalize_history(value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        other => vec![other],
    }
}

/// Write to a sibling temp file, then rename it over `path`
fn write_atomic(path: &Path, content: &str) -> Result<(), RelayError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_name = format!(
        ".{}.tmp-{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_METRICS_FILE),
        std::process::id()
    );
    let tmp_path = path
        .parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name));

    let written = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| std::fs::rename(&tmp_path, path)) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
