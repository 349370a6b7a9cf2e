//! One roster row and its conversion into an [`Event`]

use crate::types::Event;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Column holding the event name
pub const NAME_COLUMN: &str = "Event name";
/// Column holding the event date and time
pub const DATE_COLUMN: &str = "Event date and time";
/// Column holding the source-provided weekday label
pub const WEEKDAY_COLUMN: &str = "Weekday";

/// Columns every roster must declare in its header
pub const REQUIRED_COLUMNS: [&str; 3] = [NAME_COLUMN, DATE_COLUMN, WEEKDAY_COLUMN];

/// Date format used by the roster, e.g. `01/16/2024 09:00:00`
pub const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// A roster row as it appears in the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRow {
    #[serde(rename = "Event name")]
    pub name: String,
    #[serde(rename = "Event date and time")]
    pub date_time: String,
    #[serde(rename = "Weekday")]
    pub weekday: String,
}

impl SourceRow {
    /// Validate the row and convert it into an event
    pub fn into_event(self) -> Result<Event, RowError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RowError::EmptyName);
        }

        let date_time = self.date_time.trim();
        let scheduled_at = NaiveDateTime::parse_from_str(date_time, DATE_FORMAT).map_err(|e| {
            RowError::InvalidDate {
                value: date_time.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Event {
            name: name.to_string(),
            scheduled_at,
            weekday_label: self.weekday.trim().to_string(),
        })
    }
}

/// Validation errors for roster rows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("event name is empty")]
    EmptyName,

    #[error("invalid date '{value}' (expected MM/DD/YYYY HH:MM:SS): {reason}")]
    InvalidDate { value: String, reason: String },
}
