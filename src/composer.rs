//! Notification composition
//!
//! This module turns classified events into the webhook payload. Each bucket
//! becomes a numbered, indented list; an empty bucket becomes the localized
//! placeholder for that bucket so the receiving scenario never sees an empty
//! string.

use crate::classifier::Classifier;
use crate::curriculum::CurriculumTable;
use crate::types::{Bucket, ClassifiedEvent, Event, NotificationPayload, NONE_SENTINEL};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

/// Prefix placed before each numbered entry
pub const ENTRY_INDENT: &str = "   ";

/// User-facing strings used when a bucket is empty
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub no_reminders_tomorrow: String,
    pub no_reminders_window: String,
    pub no_reminders_next_weekday: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            no_reminders_tomorrow: "明天沒有任何提醒事項！".to_string(),
            no_reminders_window: "三天內沒有任何提醒事項！".to_string(),
            no_reminders_next_weekday: "下週一沒有任何提醒事項！".to_string(),
        }
    }
}

/// Composer for building notification payloads
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    curriculum: CurriculumTable,
    locale: Locale,
    trigger_weekday: Weekday,
}

impl NotificationComposer {
    pub fn new(curriculum: CurriculumTable, locale: Locale, trigger_weekday: Weekday) -> Self {
        Self {
            curriculum,
            locale,
            trigger_weekday,
        }
    }

    pub fn trigger_weekday(&self) -> Weekday {
        self.trigger_weekday
    }

    /// Build the payload for a reference date
    pub fn compose(&self, classified: &[ClassifiedEvent], reference: NaiveDate) -> NotificationPayload {
        let tomorrow = reference.succ_opt().unwrap_or(reference);
        let classes_tomorrow = self.curriculum.lookup(tomorrow.weekday()).to_string();

        let reminders_tomorrow = or_placeholder(
            numbered(bucket_entries(classified, Bucket::Tomorrow)),
            &self.locale.no_reminders_tomorrow,
        );
        let reminders_window = or_placeholder(
            numbered(bucket_entries(classified, Bucket::WithinWindow)),
            &self.locale.no_reminders_window,
        );

        let reminders_next_weekday = if reference.weekday() == self.trigger_weekday {
            or_placeholder(
                numbered(bucket_entries(classified, Bucket::NextMarkedWeekday)),
                &self.locale.no_reminders_next_weekday,
            )
        } else {
            NONE_SENTINEL.to_string()
        };

        NotificationPayload {
            classes_tomorrow,
            reminders_tomorrow,
            reminders_window,
            reminders_next_weekday,
        }
    }

    /// Convenience: classify and compose in one step
    pub fn compose_events(
        &self,
        classifier: &Classifier,
        events: &[Event],
        reference: NaiveDate,
    ) -> NotificationPayload {
        let classified = classifier.classify_all(events, reference);
        self.compose(&classified, reference)
    }
}

/// Display entries for one bucket, in source order
///
/// Only the window bucket carries the source weekday label.
fn bucket_entries(classified: &[ClassifiedEvent], bucket: Bucket) -> Vec<String> {
    classified
        .iter()
        .filter(|c| c.buckets.contains(bucket))
        .map(|c| {
            let label = c.event.weekday_label.as_str();
            if bucket == Bucket::WithinWindow && !label.is_empty() {
                format!("{} ({})", c.event.name, label)
            } else {
                c.event.name.clone()
            }
        })
        .collect()
}

/// Number entries 1..N, one per line
fn numbered(entries: Vec<String>) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{ENTRY_INDENT}{}. {entry}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_placeholder(list: String, placeholder: &str) -> String {
    if list.is_empty() {
        placeholder.to_string()
    } else {
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime, NaiveTime};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(name: &str, day: NaiveDate, label: &str) -> Event {
        Event {
            name: name.to_string(),
            scheduled_at: NaiveDateTime::new(day, NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
            weekday_label: label.to_string(),
        }
    }

    fn test_table() -> CurriculumTable {
        CurriculumTable::new([
            "mon-classes".to_string(),
            "tue-classes".to_string(),
            "wed-classes".to_string(),
            "thu-classes".to_string(),
            "fri-classes".to_string(),
            "sat-classes".to_string(),
            "sun-classes".to_string(),
        ])
    }

    fn composer(trigger: Weekday) -> NotificationComposer {
        NotificationComposer::new(test_table(), Locale::default(), trigger)
    }

    #[test]
    fn test_scenario_on_monday_without_trigger() {
        let reference = date(2024, 1, 15); // Monday
        let events = vec![
            event("Kickoff", reference + Duration::days(1), "Tue"),
            event("Review", reference + Duration::days(3), "Thu"),
            event("Standup", date(2024, 1, 19), "Fri"),
        ];

        let payload = composer(Weekday::Fri).compose_events(
            &Classifier::new(3, Weekday::Fri),
            &events,
            reference,
        );

        assert_eq!(payload.reminders_tomorrow, "   1. Kickoff");
        assert_eq!(payload.reminders_window, "   1. Review (Thu)");
        assert_eq!(payload.reminders_next_weekday, "None");
        assert_eq!(payload.classes_tomorrow, "tue-classes");
    }

    #[test]
    fn test_scenario_on_trigger_day() {
        let reference = date(2024, 1, 15); // Monday
        let events = vec![
            event("Kickoff", date(2024, 1, 16), ""),
            event("Review", date(2024, 1, 18), ""),
            event("Standup", date(2024, 1, 19), ""),
        ];

        let payload = composer(Weekday::Mon).compose_events(
            &Classifier::new(3, Weekday::Fri),
            &events,
            reference,
        );

        assert!(payload.reminders_tomorrow.contains("1. Kickoff"));
        assert!(payload.reminders_window.contains("1. Review"));
        assert_eq!(payload.reminders_next_weekday, "   1. Standup");
    }

    #[test]
    fn test_empty_events_use_placeholders() {
        let reference = date(2024, 1, 19); // Friday
        let payload = composer(Weekday::Fri).compose(&[], reference);
        let locale = Locale::default();

        assert_eq!(payload.reminders_tomorrow, locale.no_reminders_tomorrow);
        assert_eq!(payload.reminders_window, locale.no_reminders_window);
        assert_eq!(payload.reminders_next_weekday, locale.no_reminders_next_weekday);
        assert_eq!(payload.classes_tomorrow, "sat-classes");
        assert!(!payload.reminders_tomorrow.is_empty());
    }

    #[test]
    fn test_numbering_preserves_source_order() {
        let reference = date(2024, 1, 15);
        let events = vec![
            event("Quiz", date(2024, 1, 16), ""),
            event("Essay", date(2024, 1, 16), ""),
            event("Lab", date(2024, 1, 17), "Wed"),
            event("Project", date(2024, 1, 18), ""),
        ];

        let payload = composer(Weekday::Fri).compose_events(&Classifier::default(), &events, reference);

        assert_eq!(payload.reminders_tomorrow, "   1. Quiz\n   2. Essay");
        assert_eq!(payload.reminders_window, "   1. Lab (Wed)\n   2. Project");
    }

    #[test]
    fn test_tomorrow_is_not_annotated() {
        let reference = date(2024, 1, 15);
        let events = vec![event("Quiz", date(2024, 1, 16), "Tue")];

        let payload = composer(Weekday::Fri).compose_events(&Classifier::default(), &events, reference);

        assert_eq!(payload.reminders_tomorrow, "   1. Quiz");
    }

    #[test]
    fn test_classes_tomorrow_wraps_sunday_to_monday() {
        let payload = composer(Weekday::Fri).compose(&[], date(2024, 1, 21));
        assert_eq!(payload.classes_tomorrow, "mon-classes");
    }

    #[test]
    fn test_custom_locale() {
        let locale = Locale {
            no_reminders_tomorrow: "nothing tomorrow".to_string(),
            no_reminders_window: "nothing soon".to_string(),
            no_reminders_next_weekday: "nothing monday".to_string(),
        };
        let composer = NotificationComposer::new(test_table(), locale, Weekday::Mon);

        let payload = composer.compose(&[], date(2024, 1, 15));
        assert_eq!(payload.reminders_tomorrow, "nothing tomorrow");
        assert_eq!(payload.reminders_window, "nothing soon");
        assert_eq!(payload.reminders_next_weekday, "nothing monday");
    }
}
