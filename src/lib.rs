//! Reminder Flux - event roster classification and webhook relay
//!
//! Reminder Flux reads a roster of scheduled events and turns it into one
//! notification per run through a deterministic pipeline: roster reading →
//! temporal classification → payload composition → webhook delivery →
//! metrics recording.
//!
//! ## Modules
//!
//! - **Source**: parse the delimited roster into [`Event`]s
//! - **Classifier**: place events into tomorrow / window / next-weekday buckets
//! - **Composer**: build the [`NotificationPayload`] with the injected curriculum
//! - **Delivery**: post the payload to a webhook (or print it in dry-run mode)
//! - **Metrics**: append per-run metrics to a JSON history

pub mod classifier;
pub mod composer;
pub mod config;
pub mod curriculum;
pub mod delivery;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod source;
pub mod types;

pub use classifier::Classifier;
pub use composer::{Locale, NotificationComposer};
pub use config::RelayConfig;
pub use curriculum::CurriculumTable;
pub use delivery::{DeliveryOutcome, DeliverySink, DryRunSink, WebhookClient};
pub use error::RelayError;
pub use metrics::MetricsStore;
pub use pipeline::{ReminderPipeline, RunPlan, RunReport};
pub use source::EventSource;
pub use types::{Bucket, BucketSet, Event, MetricsRecord, NotificationPayload};

/// Version reported by the CLI and the webhook user agent
pub const RELAY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name used in logs and reports
pub const PRODUCER_NAME: &str = "reminder-flux";
