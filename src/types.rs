//! Core types for the Reminder Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: source events, bucket classifications, the notification payload
//! and the per-run metrics record.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Literal sent in place of the next-weekday reminders outside the trigger day
pub const NONE_SENTINEL: &str = "None";

/// A scheduled event read from the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name as written in the source
    pub name: String,
    /// Local wall-clock date and time of the event
    pub scheduled_at: NaiveDateTime,
    /// Weekday label supplied by the source (may be empty)
    pub weekday_label: String,
}

impl Event {
    /// Calendar date of the event
    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }
}

/// Temporal bucket an event may fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Tomorrow,
    WithinWindow,
    NextMarkedWeekday,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Tomorrow => "tomorrow",
            Bucket::WithinWindow => "within_window",
            Bucket::NextMarkedWeekday => "next_marked_weekday",
        }
    }
}

/// Set of buckets an event belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketSet {
    pub tomorrow: bool,
    pub within_window: bool,
    pub next_marked_weekday: bool,
}

impl BucketSet {
    pub fn contains(&self, bucket: Bucket) -> bool {
        match bucket {
            Bucket::Tomorrow => self.tomorrow,
            Bucket::WithinWindow => self.within_window,
            Bucket::NextMarkedWeekday => self.next_marked_weekday,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.tomorrow || self.within_window || self.next_marked_weekday)
    }

    /// Buckets present in the set, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Bucket> + '_ {
        [Bucket::Tomorrow, Bucket::WithinWindow, Bucket::NextMarkedWeekday]
            .into_iter()
            .filter(move |b| self.contains(*b))
    }
}

/// An event paired with its classification against the reference date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub event: Event,
    pub buckets: BucketSet,
}

/// Payload posted to the automation webhook
///
/// Field names on the wire follow the receiving scenario: the window bucket is
/// `reminders_week` and the next-weekday bucket is `reminders_monday`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Curriculum block for tomorrow's weekday
    pub classes_tomorrow: String,
    /// Numbered list of tomorrow's events, or the empty placeholder
    pub reminders_tomorrow: String,
    /// Numbered list of events within the window, or the empty placeholder
    #[serde(rename = "reminders_week")]
    pub reminders_window: String,
    /// Numbered list for the next marked weekday, or [`NONE_SENTINEL`]
    #[serde(rename = "reminders_monday")]
    pub reminders_next_weekday: String,
}

/// One run's execution metrics, appended to the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Reference instant of the run
    pub timestamp: DateTime<FixedOffset>,
    pub reminders_tomorrow_count: usize,
    pub reminders_window_count: usize,
    /// Tomorrow plus window reminders
    pub total_reminders_count: usize,
    /// Wall time of the run in seconds
    pub execution_time: f64,
    /// Resident memory growth over the run in MB
    pub memory_delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}
