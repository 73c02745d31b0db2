//! Metrics sink boundary.
//!
//! Core read logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.

use crate::obs::metrics;

///
/// ReadKind
///

#[derive(Clone, Copy, Debug)]
pub enum ReadKind {
    Get,
    Between,
    Major,
    Minor,
    Keys,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ReadStart { kind: ReadKind },
    ReadDelegated { kind: ReadKind },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into the global metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ReadStart { kind } => {
                metrics::with_state_mut(|m| {
                    let counter = match kind {
                        ReadKind::Get => &mut m.get_calls,
                        ReadKind::Between => &mut m.between_scans,
                        ReadKind::Major => &mut m.major_scans,
                        ReadKind::Minor => &mut m.minor_scans,
                        ReadKind::Keys => &mut m.key_set_scans,
                    };
                    *counter = counter.saturating_add(1);
                });
            }
            MetricsEvent::ReadDelegated { .. } => {
                metrics::with_state_mut(|m| {
                    m.delegated_reads = m.delegated_reads.saturating_add(1);
                });
            }
        }
    }
}

/// Record one event against the global sink.
pub(crate) fn record(event: MetricsEvent) {
    GlobalMetricsSink.record(event);
}
