//! Reader turning a roster file into events

use crate::error::RelayError;
use crate::source::row::{SourceRow, REQUIRED_COLUMNS};
use crate::types::Event;
use encoding_rs::Encoding;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default text encoding of the roster file
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Location and encoding of the roster file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventSource {
    /// Path to the delimited roster file
    pub path: PathBuf,
    /// WHATWG encoding label, e.g. `utf-8` or `big5`
    pub encoding: String,
    /// Field delimiter
    pub delimiter: char,
}

impl Default for EventSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from("reminders.csv"),
            encoding: DEFAULT_ENCODING.to_string(),
            delimiter: ',',
        }
    }
}

impl EventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Resolve the configured encoding label
    pub fn resolve_encoding(&self) -> Result<&'static Encoding, RelayError> {
        Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            RelayError::Config(format!("unknown source encoding '{}'", self.encoding))
        })
    }

    /// Read every event from the file, in file order
    ///
    /// Any bad row aborts the whole read.
    pub fn read_events(&self) -> Result<Vec<Event>, RelayError> {
        let encoding = self.resolve_encoding()?;
        let delimiter = u8::try_from(self.delimiter).map_err(|_| {
            RelayError::Config(format!("delimiter '{}' is not a single byte", self.delimiter))
        })?;

        let bytes = std::fs::read(&self.path)?;
        let text = decode(&bytes, encoding, &self.path)?;
        let events = parse_events(&text, delimiter)?;

        tracing::debug!(
            path = %self.path.display(),
            encoding = encoding.name(),
            events = events.len(),
            "read event roster"
        );
        Ok(events)
    }
}

fn decode(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> Result<String, RelayError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(RelayError::Parse(format!(
            "{} is not valid {} text",
            path.display(),
            used.name()
        )));
    }
    Ok(text.into_owned())
}

/// Parse roster text with a header row into events
pub fn parse_events(text: &str, delimiter: u8) -> Result<Vec<Event>, RelayError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RelayError::Parse(format!("unreadable header row: {e}")))?
        .clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(RelayError::Parse(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut events = Vec::new();
    for (index, result) in reader.deserialize::<SourceRow>().enumerate() {
        let row_number = index + 1;
        let row = result.map_err(|e| RelayError::Parse(format!("row {row_number}: {e}")))?;
        let event = row
            .into_event()
            .map_err(|e| RelayError::Parse(format!("row {row_number}: {e}")))?;
        events.push(event);
    }

    Ok(events)
}
