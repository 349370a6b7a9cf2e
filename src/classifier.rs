//! Temporal classification
//!
//! This module decides which reminder buckets an event belongs to relative to a
//! reference date. Classification only looks at calendar dates; the time of day
//! of both the event and the reference instant is ignored.
//! - `tomorrow`: the event falls on the day after the reference date
//! - `within_window`: the event falls in `(R, R + window_days]` but not tomorrow
//! - `next_marked_weekday`: the event falls on the next occurrence of a fixed
//!   weekday strictly after the reference date

use crate::types::{BucketSet, ClassifiedEvent, Event};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Default look-ahead window in days
pub const DEFAULT_WINDOW_DAYS: u32 = 3;

/// Classifier for placing events into reminder buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    window_days: u32,
    marked_weekday: Weekday,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, Weekday::Mon)
    }
}

impl Classifier {
    /// Create a classifier with the given window length and marked weekday
    pub fn new(window_days: u32, marked_weekday: Weekday) -> Self {
        Self {
            window_days,
            marked_weekday,
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn marked_weekday(&self) -> Weekday {
        self.marked_weekday
    }

    /// Classify a single event against the reference date
    pub fn classify(&self, event: &Event, reference: NaiveDate) -> BucketSet {
        self.classify_date(event.date(), reference)
    }

    /// Classify a bare calendar date against the reference date
    pub fn classify_date(&self, date: NaiveDate, reference: NaiveDate) -> BucketSet {
        let tomorrow = is_tomorrow(date, reference);
        let in_window = in_window_range(date, reference, self.window_days);

        BucketSet {
            tomorrow,
            within_window: exclusive_window(tomorrow, in_window),
            next_marked_weekday: date == next_weekday_after(reference, self.marked_weekday),
        }
    }

    /// Classify every event, preserving source order
    pub fn classify_all(&self, events: &[Event], reference: NaiveDate) -> Vec<ClassifiedEvent> {
        events
            .iter()
            .map(|event| ClassifiedEvent {
                event: event.clone(),
                buckets: self.classify(event, reference),
            })
            .collect()
    }
}

/// True when `date` is the day after `reference`
pub fn is_tomorrow(date: NaiveDate, reference: NaiveDate) -> bool {
    reference.succ_opt() == Some(date)
}

/// True when `reference < date <= reference + days`
///
/// The reference date itself is never inside the window.
pub fn in_window_range(date: NaiveDate, reference: NaiveDate, days: u32) -> bool {
    let upper = reference + Duration::days(i64::from(days));
    date > reference && date <= upper
}

/// Tie-break between the tomorrow and window buckets.
///
/// An event that is tomorrow is reported only under `tomorrow`.
pub fn exclusive_window(tomorrow: bool, in_window: bool) -> bool {
    in_window && !tomorrow
}

/// Next date strictly after `reference` that falls on `target`
///
/// When `reference` is already `target`, this wraps to the following week.
pub fn next_weekday_after(reference: NaiveDate, target: Weekday) -> NaiveDate {
    let current = reference.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let offset = match (7 - current + wanted) % 7 {
        0 => 7,
        n => n,
    };
    reference + Duration::days(i64::from(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_on(name: &str, day: NaiveDate) -> Event {
        Event {
            name: name.to_string(),
            scheduled_at: NaiveDateTime::new(day, NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            weekday_label: String::new(),
        }
    }

    fn monday() -> NaiveDate {
        date(2024, 1, 15)
    }

    #[test]
    fn test_tomorrow_is_only_tomorrow() {
        let classifier = Classifier::default();
        let buckets = classifier.classify_date(date(2024, 1, 16), monday());

        assert!(buckets.tomorrow);
        assert!(!buckets.within_window);
    }

    #[test]
    fn test_window_exclusivity_across_offsets() {
        let classifier = Classifier::default();
        let reference = monday();

        for offset in -3i64..=6 {
            let day = reference + Duration::days(offset);
            let buckets = classifier.classify_date(day, reference);
            let in_range = offset >= 1 && offset <= 3;

            assert_eq!(
                buckets.tomorrow as u8 + buckets.within_window as u8,
                in_range as u8,
                "offset {offset}"
            );
            assert_eq!(buckets.tomorrow, offset == 1, "offset {offset}");
        }
    }

    #[test]
    fn test_reference_date_is_not_in_window() {
        assert!(!in_window_range(monday(), monday(), 3));
        assert!(in_window_range(date(2024, 1, 18), monday(), 3));
        assert!(!in_window_range(date(2024, 1, 19), monday(), 3));
    }

    #[test]
    fn test_exclusive_window_rule() {
        assert!(!exclusive_window(true, true));
        assert!(exclusive_window(false, true));
        assert!(!exclusive_window(false, false));
        assert!(!exclusive_window(true, false));
    }

    #[test]
    fn test_next_weekday_is_strictly_future() {
        let reference = monday();
        for target in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let next = next_weekday_after(reference, target);
            assert!(next > reference);
            assert!(next <= reference + Duration::days(7));
            assert_eq!(next.weekday(), target);
        }
    }

    #[test]
    fn test_next_weekday_wraps_on_same_day() {
        assert_eq!(next_weekday_after(monday(), Weekday::Mon), date(2024, 1, 22));
        // Friday 2024-01-19 -> Monday 2024-01-22
        assert_eq!(next_weekday_after(date(2024, 1, 19), Weekday::Mon), date(2024, 1, 22));
        // Sunday 2024-01-21 -> Monday 2024-01-22
        assert_eq!(next_weekday_after(date(2024, 1, 21), Weekday::Mon), date(2024, 1, 22));
    }

    #[test]
    fn test_next_marked_weekday_co_occurs_with_tomorrow() {
        // Sunday reference: tomorrow is the next Monday
        let classifier = Classifier::new(3, Weekday::Mon);
        let buckets = classifier.classify_date(date(2024, 1, 22), date(2024, 1, 21));

        assert!(buckets.tomorrow);
        assert!(buckets.next_marked_weekday);
        assert!(!buckets.within_window);
    }

    #[test]
    fn test_classification_is_pure() {
        let classifier = Classifier::default();
        let event = event_on("Review", date(2024, 1, 18));

        let first = classifier.classify(&event, monday());
        let second = classifier.classify(&event, monday());
        assert_eq!(first, second);
        assert!(first.within_window);
    }

    #[test]
    fn test_custom_window_length() {
        let classifier = Classifier::new(7, Weekday::Mon);
        let buckets = classifier.classify_date(date(2024, 1, 22), monday());

        assert!(buckets.within_window);
        assert!(buckets.next_marked_weekday);
    }

    #[test]
    fn test_classify_all_preserves_order() {
        let classifier = Classifier::default();
        let events = vec![
            event_on("b", date(2024, 1, 17)),
            event_on("a", date(2024, 1, 16)),
            event_on("past", date(2024, 1, 10)),
        ];

        let classified = classifier.classify_all(&events, monday());
        let names: Vec<_> = classified.iter().map(|c| c.event.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "past"]);
        assert!(classified[2].buckets.is_empty());
    }
}
