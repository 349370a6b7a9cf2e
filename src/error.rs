//! Error types for Reminder Flux

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run
///
/// Delivery failures are deliberately absent: they are reported as
/// [`crate::delivery::DeliveryOutcome::Failed`] and never stop the pipeline.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to parse event source: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics store {} is not valid JSON: {}", .path.display(), .source)]
    CorruptMetricsStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// Stable machine-readable code for CLI error reports
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Parse(_) => "PARSE_ERROR",
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::CorruptMetricsStore { .. } => "CORRUPT_METRICS_STORE",
            RelayError::Io(_) => "IO_ERROR",
            RelayError::Json(_) => "JSON_ERROR",
        }
    }
}

impl From<toml::de::Error> for RelayError {
    fn from(e: toml::de::Error) -> Self {
        RelayError::Config(e.to_string())
    }
}
