//! Payload delivery sinks
//!
//! This module provides sinks that hand the composed payload to the outside
//! world. Delivery never fails the run: every sink reports a
//! [`DeliveryOutcome`] and the pipeline only logs a failure.

mod dry_run;
mod webhook;

pub use dry_run::DryRunSink;
pub use webhook::{WebhookClient, DEFAULT_TIMEOUT_SECS};

use crate::types::NotificationPayload;

/// Result of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The sink accepted the payload
    Delivered { status: u16 },
    /// Non-2xx response (`status` set) or transport error (`status` empty)
    Failed { status: Option<u16>, reason: String },
}

impl DeliveryOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    /// HTTP status reported by the sink, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryOutcome::Delivered { status } => Some(*status),
            DeliveryOutcome::Failed { status, .. } => *status,
        }
    }
}

/// Trait for payload sinks
pub trait DeliverySink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Deliver the payload once; no retries
    fn deliver(&self, payload: &NotificationPayload) -> DeliveryOutcome;

    /// Whether runs through this sink are appended to the metrics history
    fn records_metrics(&self) -> bool {
        true
    }
}

impl<S: DeliverySink + ?Sized> DeliverySink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deliver(&self, payload: &NotificationPayload) -> DeliveryOutcome {
        (**self).deliver(payload)
    }

    fn records_metrics(&self) -> bool {
        (**self).records_metrics()
    }
}
