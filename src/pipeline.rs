//! Pipeline orchestration
//!
//! This module wires the stages into one run:
//! read roster → classify → compose → deliver → record metrics.
//!
//! The reference instant is captured once at the start of a run and reused
//! for every bucket computation and for the metrics timestamp.

use crate::classifier::Classifier;
use crate::composer::NotificationComposer;
use crate::config::RelayConfig;
use crate::delivery::{DeliveryOutcome, DeliverySink};
use crate::error::RelayError;
use crate::metrics::{MetricsStore, ReminderCounts, RunProbe};
use crate::source::EventSource;
use crate::types::{Bucket, ClassifiedEvent, MetricsRecord, NotificationPayload};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use uuid::Uuid;

/// Classified events and the payload built from them, before delivery
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub reference_date: NaiveDate,
    pub classified: Vec<ClassifiedEvent>,
    pub payload: NotificationPayload,
}

impl RunPlan {
    /// Reminder counts as recorded in the metrics history
    pub fn counts(&self) -> ReminderCounts {
        let count = |bucket: Bucket| {
            self.classified
                .iter()
                .filter(|c| c.buckets.contains(bucket))
                .count()
        };
        ReminderCounts {
            tomorrow: count(Bucket::Tomorrow),
            window: count(Bucket::WithinWindow),
        }
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub payload: NotificationPayload,
    pub outcome: DeliveryOutcome,
    pub record: MetricsRecord,
    /// Records in the metrics history after this run; `None` when the sink
    /// keeps runs out of the history
    pub history_len: Option<usize>,
}

/// Runs the reminder pipeline against a delivery sink
pub struct ReminderPipeline<S: DeliverySink> {
    source: EventSource,
    classifier: Classifier,
    composer: NotificationComposer,
    metrics: MetricsStore,
    sink: S,
}

impl<S: DeliverySink> ReminderPipeline<S> {
    /// Build a pipeline from configuration
    ///
    /// Configuration errors surface here, before any side effect.
    pub fn from_config(config: &RelayConfig, sink: S) -> Result<Self, RelayError> {
        config.validate()?;
        Ok(Self {
            source: config.source.clone(),
            classifier: config.classifier(),
            composer: config.composer()?,
            metrics: config.metrics_store(),
            sink,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Read, classify and compose without delivering or recording
    pub fn plan_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<RunPlan, RelayError> {
        let reference_date = now.naive_local().date();
        let events = self.source.read_events()?;
        let classified = self.classifier.classify_all(&events, reference_date);
        let payload = self.composer.compose(&classified, reference_date);

        Ok(RunPlan {
            reference_date,
            classified,
            payload,
        })
    }

    /// Run the full pipeline with the current local time as reference
    pub fn run(&self) -> Result<RunReport, RelayError> {
        self.run_at(&Local::now())
    }

    /// Run the full pipeline against a fixed reference instant
    pub fn run_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<RunReport, RelayError> {
        let probe = RunProbe::start();
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        let _guard = span.enter();

        let plan = self.plan_at(now)?;
        let counts = plan.counts();
        tracing::info!(
            reference_date = %plan.reference_date,
            events = plan.classified.len(),
            tomorrow = counts.tomorrow,
            window = counts.window,
            "classified events"
        );

        let outcome = self.sink.deliver(&plan.payload);
        match &outcome {
            DeliveryOutcome::Delivered { status } => {
                tracing::info!(sink = self.sink.name(), status, "delivered notification");
            }
            DeliveryOutcome::Failed { status, reason } => {
                tracing::warn!(
                    sink = self.sink.name(),
                    status = ?status,
                    %reason,
                    "notification delivery failed"
                );
            }
        }

        if !self.sink.records_metrics() {
            tracing::info!(sink = self.sink.name(), "metrics recording skipped");
            let record = probe.finish(now.fixed_offset(), counts, run_id, None);
            return Ok(RunReport {
                run_id,
                payload: plan.payload,
                outcome,
                record,
                history_len: None,
            });
        }

        let delivered = Some(outcome.is_ok());
        let record = probe.finish(now.fixed_offset(), counts, run_id, delivered);
        let history_len = self.metrics.append(&record)?;
        tracing::info!(
            execution_time = record.execution_time,
            memory_delta = record.memory_delta,
            history_len,
            "recorded run metrics"
        );

        Ok(RunReport {
            run_id,
            payload: plan.payload,
            outcome,
            record,
            history_len: Some(history_len),
        })
    }
}
