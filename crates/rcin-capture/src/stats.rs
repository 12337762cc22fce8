//! Capture counters for diagnostics.
//!
//! Every outcome of the channel state machine is counted here so that
//! rejected, unsynchronized and out-of-order edges stay observable without
//! logging on the interrupt path.

use portable_atomic::{AtomicU32, Ordering};

use crate::channel::EdgeOutcome;

/// Counter snapshot returned by [`CaptureCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureStats {
    /// Edges fed to any channel.
    pub edges: u32,
    /// Pulses accepted and published.
    pub accepted: u32,
    /// Pulses rejected by the width window.
    pub rejected_width: u32,
    /// Rises whose preceding low time failed the gap window.
    pub unsynchronized: u32,
    /// Edges received in the wrong state.
    pub sequence_anomalies: u32,
    /// Channels declared dead.
    pub timeouts: u32,
}

/// Atomic capture counters.
///
/// All increments use `Ordering::Relaxed` and wrap on overflow. Values are
/// diagnostics only and never feed back into decoding.
///
/// # Example
///
/// ```rust
/// use rcin_capture::{CaptureCounters, EdgeOutcome};
///
/// let counters = CaptureCounters::new();
/// counters.record(&EdgeOutcome::Armed);
/// counters.record(&EdgeOutcome::Accepted { width_us: 1_500 });
///
/// let stats = counters.snapshot();
/// assert_eq!(stats.edges, 2);
/// assert_eq!(stats.accepted, 1);
/// ```
#[derive(Debug, Default)]
pub struct CaptureCounters {
    edges: AtomicU32,
    accepted: AtomicU32,
    rejected_width: AtomicU32,
    unsynchronized: AtomicU32,
    sequence_anomalies: AtomicU32,
    timeouts: AtomicU32,
}

impl CaptureCounters {
    /// Create counters initialized to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edges: AtomicU32::new(0),
            accepted: AtomicU32::new(0),
            rejected_width: AtomicU32::new(0),
            unsynchronized: AtomicU32::new(0),
            sequence_anomalies: AtomicU32::new(0),
            timeouts: AtomicU32::new(0),
        }
    }

    /// Count one state machine outcome.
    #[inline]
    pub fn record(&self, outcome: &EdgeOutcome) {
        if outcome.is_edge() {
            self.edges.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match outcome {
            EdgeOutcome::Accepted { .. } => &self.accepted,
            EdgeOutcome::RejectedWidth { .. } => &self.rejected_width,
            EdgeOutcome::Unsynchronized { .. } => &self.unsynchronized,
            EdgeOutcome::SequenceAnomaly { .. } => &self.sequence_anomalies,
            EdgeOutcome::TimedOut => &self.timeouts,
            EdgeOutcome::Armed | EdgeOutcome::Discarded { .. } => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            edges: self.edges.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_width: self.rejected_width.load(Ordering::Relaxed),
            unsynchronized: self.unsynchronized.load(Ordering::Relaxed),
            sequence_anomalies: self.sequence_anomalies.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.edges.store(0, Ordering::Relaxed);
        self.accepted.store(0, Ordering::Relaxed);
        self.rejected_width.store(0, Ordering::Relaxed);
        self.unsynchronized.store(0, Ordering::Relaxed);
        self.sequence_anomalies.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ExpectedEdge;

    #[test]
    fn test_record_each_outcome() {
        let counters = CaptureCounters::new();
        counters.record(&EdgeOutcome::Armed);
        counters.record(&EdgeOutcome::Unsynchronized { gap_us: 10 });
        counters.record(&EdgeOutcome::Accepted { width_us: 1_500 });
        counters.record(&EdgeOutcome::RejectedWidth { width_us: 375 });
        counters.record(&EdgeOutcome::Discarded { width_us: 1_500 });
        counters.record(&EdgeOutcome::SequenceAnomaly {
            expected: ExpectedEdge::Rise,
        });
        counters.record(&EdgeOutcome::TimedOut);

        let stats = counters.snapshot();
        assert_eq!(
            stats,
            CaptureStats {
                edges: 6,
                accepted: 1,
                rejected_width: 1,
                unsynchronized: 1,
                sequence_anomalies: 1,
                timeouts: 1,
            }
        );
    }

    #[test]
    fn test_reset() {
        let counters = CaptureCounters::new();
        counters.record(&EdgeOutcome::TimedOut);
        counters.reset();
        assert_eq!(counters.snapshot(), CaptureStats::default());
    }
}
