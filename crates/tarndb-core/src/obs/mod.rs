//! Observability: read telemetry and the sink abstraction.
//!
//! This module does not reach into index internals; the read surfaces
//! record events through the sink boundary.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::ReadReport;
pub use sink::{MetricsEvent, MetricsSink, ReadKind};

/// Snapshot the process-local read metrics.
#[must_use]
pub fn metrics_report() -> ReadReport {
    metrics::with_state(|state| *state)
}

/// Reset the process-local read metrics to zero.
pub fn metrics_reset_all() {
    metrics::reset();
}

///
/// TESTS
///
