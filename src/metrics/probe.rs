//! Timing and memory measurement for a single run

use crate::types::MetricsRecord;
use chrono::{DateTime, FixedOffset};
use std::time::Instant;
use uuid::Uuid;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reminder counts reported by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderCounts {
    pub tomorrow: usize,
    pub window: usize,
}

impl ReminderCounts {
    pub fn total(&self) -> usize {
        self.tomorrow + self.window
    }
}

/// Captures start time and resident memory when a run begins
#[derive(Debug, Clone)]
pub struct RunProbe {
    started: Instant,
    start_rss: Option<u64>,
}

impl RunProbe {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            start_rss: resident_memory_bytes(),
        }
    }

    /// Seconds elapsed since the probe started
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Resident memory growth in MB, or 0.0 where RSS is unavailable
    pub fn memory_delta_mb(&self) -> f64 {
        match (self.start_rss, resident_memory_bytes()) {
            (Some(start), Some(end)) => (end as f64 - start as f64) / BYTES_PER_MB,
            _ => 0.0,
        }
    }

    /// Build the metrics record for this run
    ///
    /// `timestamp` must be the run's reference instant, not a fresh clock read.
    pub fn finish(
        &self,
        timestamp: DateTime<FixedOffset>,
        counts: ReminderCounts,
        run_id: Uuid,
        delivered: Option<bool>,
    ) -> MetricsRecord {
        MetricsRecord {
            timestamp,
            reminders_tomorrow_count: counts.tomorrow,
            reminders_window_count: counts.window,
            total_reminders_count: counts.total(),
            execution_time: self.elapsed_secs(),
            memory_delta: self.memory_delta_mb(),
            run_id: Some(run_id),
            delivered,
        }
    }
}

/// Resident set size of this process, read from `/proc/self/status`
#[cfg(target_os = "linux")]
pub fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub fn resident_memory_bytes() -> Option<u64> {
    None
}
