//! Run metrics
//!
//! Each run appends one [`MetricsRecord`](crate::types::MetricsRecord) to an
//! append-only JSON history. [`RunProbe`] measures the run, [`MetricsStore`]
//! persists it.

mod probe;
mod store;

pub use probe::*;
pub use store::*;
