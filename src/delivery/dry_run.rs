//! Sink that prints the payload instead of posting it

use super::{DeliveryOutcome, DeliverySink};
use crate::types::NotificationPayload;
use std::io::Write;
use std::sync::Mutex;

/// Writes the pretty-printed payload to a writer and reports success
///
/// Nothing leaves the process, so runs through this sink are kept out of the
/// metrics history.
pub struct DryRunSink<W: Write> {
    out: Mutex<W>,
}

impl DryRunSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DryRunSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> DeliverySink for DryRunSink<W> {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn records_metrics(&self) -> bool {
        false
    }

    fn deliver(&self, payload: &NotificationPayload) -> DeliveryOutcome {
        let json = match serde_json::to_string_pretty(payload) {
            Ok(json) => json,
            Err(e) => {
                return DeliveryOutcome::Failed {
                    status: None,
                    reason: e.to_string(),
                }
            }
        };

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        match writeln!(out, "{json}").and_then(|_| out.flush()) {
            Ok(()) => DeliveryOutcome::Delivered { status: 200 },
            Err(e) => DeliveryOutcome::Failed {
                status: None,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_payload_json() {
        let sink = DryRunSink::new(Vec::new());
        let payload = NotificationPayload {
            classes_tomorrow: "math".to_string(),
            reminders_tomorrow: "   1. Quiz".to_string(),
            reminders_window: "none".to_string(),
            reminders_next_weekday: "None".to_string(),
        };

        assert!(sink.deliver(&payload).is_ok());
        assert!(!sink.records_metrics());

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["reminders_week"], "none");
        assert_eq!(value["reminders_monday"], "None");
    }
}
