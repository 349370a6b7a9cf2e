//! Run configuration
//!
//! Configuration is read from an optional TOML file; every section has a
//! default matching the original school-reminder deployment. The CLI layers
//! flags and environment variables (`MAKE_WEBHOOK_URL`) on top.
//!
//! ```toml
//! [source]
//! path = "reminders.csv"
//! encoding = "big5"
//!
//! [schedule]
//! window_days = 3
//! marked_weekday = "monday"
//! trigger_weekday = "friday"
//!
//! [delivery]
//! webhook_url = "https://hook.example.com/abc"
//! timeout_secs = 30
//!
//! [metrics]
//! path = "metrics.json"
//!
//! [curriculum]
//! monday = "   Math \n   Physics"
//! # ... all seven weekdays are required when the section is present
//! ```

use crate::classifier::{Classifier, DEFAULT_WINDOW_DAYS};
use crate::composer::{Locale, NotificationComposer};
use crate::curriculum::{CurriculumSpec, CurriculumTable};
use crate::delivery::{WebhookClient, DEFAULT_TIMEOUT_SECS};
use crate::error::RelayError;
use crate::metrics::{MetricsStore, DEFAULT_METRICS_FILE};
use crate::source::EventSource;
use chrono::Weekday;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the webhook URL
pub const WEBHOOK_URL_ENV: &str = "MAKE_WEBHOOK_URL";

/// Temporal window settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Length of the look-ahead window in days
    pub window_days: u32,
    /// Weekday whose next occurrence forms its own bucket
    pub marked_weekday: Weekday,
    /// Weekday on which the marked-weekday bucket is sent
    pub trigger_weekday: Weekday,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            marked_weekday: Weekday::Mon,
            trigger_weekday: Weekday::Fri,
        }
    }
}

/// Webhook settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Metrics history settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub path: PathBuf,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_METRICS_FILE),
        }
    }
}

/// Full configuration for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub source: EventSource,
    pub schedule: ScheduleConfig,
    pub locale: Locale,
    /// Custom curriculum; the built-in table is used when absent
    pub curriculum: Option<CurriculumSpec>,
    pub delivery: DeliveryConfig,
    pub metrics: MetricsConfig,
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RelayError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RelayError> {
        Ok(toml::from_str(content)?)
    }

    /// Check everything a run needs except the webhook URL
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.schedule.window_days == 0 {
            return Err(RelayError::Config(
                "schedule.window_days must be at least 1".to_string(),
            ));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(RelayError::Config(
                "delivery.timeout_secs must be at least 1".to_string(),
            ));
        }
        self.source.resolve_encoding()?;
        self.curriculum_table()?;
        Ok(())
    }

    pub fn curriculum_table(&self) -> Result<CurriculumTable, RelayError> {
        match &self.curriculum {
            Some(spec) => CurriculumTable::from_spec(spec),
            None => Ok(CurriculumTable::default()),
        }
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.schedule.window_days, self.schedule.marked_weekday)
    }

    pub fn composer(&self) -> Result<NotificationComposer, RelayError> {
        Ok(NotificationComposer::new(
            self.curriculum_table()?,
            self.locale.clone(),
            self.schedule.trigger_weekday,
        ))
    }

    pub fn metrics_store(&self) -> MetricsStore {
        MetricsStore::new(&self.metrics.path)
    }

    /// Build the webhook client; a missing URL is a config error
    pub fn webhook_client(&self) -> Result<WebhookClient, RelayError> {
        let url = self
            .delivery
            .webhook_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                RelayError::Config(format!(
                    "no webhook URL configured (set delivery.webhook_url or {WEBHOOK_URL_ENV})"
                ))
            })?;
        WebhookClient::new(url, Duration::from_secs(self.delivery.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();

        assert_eq!(config.schedule.window_days, 3);
        assert_eq!(config.schedule.marked_weekday, Weekday::Mon);
        assert_eq!(config.schedule.trigger_weekday, Weekday::Fri);
        assert_eq!(config.source.encoding, "utf-8");
        assert_eq!(config.metrics.path, PathBuf::from("metrics.json"));
        assert_eq!(config.delivery.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RelayConfig::from_toml_str("").unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let config = RelayConfig::from_toml_str(
            r#"
            [source]
            path = "/srv/roster.csv"
            encoding = "big5"

            [schedule]
            window_days = 5
            marked_weekday = "tuesday"
            trigger_weekday = "Sun"

            [locale]
            no_reminders_tomorrow = "nothing tomorrow"

            [delivery]
            webhook_url = "https://hook.example.com/abc"
            timeout_secs = 10

            [metrics]
            path = "/var/lib/reminders/metrics.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.path, PathBuf::from("/srv/roster.csv"));
        assert_eq!(config.source.encoding, "big5");
        assert_eq!(config.source.delimiter, ',');
        assert_eq!(config.schedule.window_days, 5);
        assert_eq!(config.schedule.marked_weekday, Weekday::Tue);
        assert_eq!(config.schedule.trigger_weekday, Weekday::Sun);
        assert_eq!(config.locale.no_reminders_tomorrow, "nothing tomorrow");
        assert_eq!(config.locale.no_reminders_window, Locale::default().no_reminders_window);
        assert_eq!(config.delivery.timeout_secs, 10);
        assert!(config.validate().is_ok());
        assert!(config.webhook_client().is_ok());
    }

    #[test]
    fn test_incomplete_curriculum_fails_validation() {
        let config = RelayConfig::from_toml_str(
            r#"
            [curriculum]
            monday = "math"
            friday = "art"
            "#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(RelayError::Config(_))));
        assert!(config.composer().is_err());
    }

    #[test]
    fn test_complete_curriculum_is_used() {
        let config = RelayConfig::from_toml_str(
            r#"
            [curriculum]
            monday = "m"
            tuesday = "t"
            wednesday = "w"
            thursday = "th"
            friday = "f"
            saturday = "sa"
            sunday = "su"
            "#,
        )
        .unwrap();

        let table = config.curriculum_table().unwrap();
        assert_eq!(table.lookup(Weekday::Thu), "th");
    }

    #[test]
    fn test_missing_webhook_url_is_config_error() {
        let mut config = RelayConfig::default();
        assert!(matches!(config.webhook_client(), Err(RelayError::Config(_))));

        config.delivery.webhook_url = Some("   ".to_string());
        assert!(matches!(config.webhook_client(), Err(RelayError::Config(_))));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut config = RelayConfig::default();
        config.schedule.window_days = 0;
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.source.encoding = "nope".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = RelayConfig::from_toml_str("[schedule]\nwindow_days = \"three\"").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.toml");
        std::fs::write(&path, "[metrics]\npath = \"history.json\"\n").unwrap();

        let config = RelayConfig::from_file(&path).unwrap();
        assert_eq!(config.metrics.path, PathBuf::from("history.json"));

        let missing = RelayConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(RelayError::Config(_))));
    }
}
