//! Per-channel edge capture state machine.
//!
//! A channel alternates between waiting for a rising edge and waiting for a
//! falling edge. Timestamps are raw counter values; every interval goes
//! through [`TimerState::interval_us`] together with the number of timer
//! wraps seen since the previous edge, so wraps between the two edges are
//! handled in one place.
//!
//! ```text
//!            rise (gap ok)              fall (armed, width ok)
//!   ┌──────┐ ─────────────► ┌──────┐ ──────────────────────► publish
//!   │ Rise │                │ Fall │
//!   └──────┘ ◄───────────── └──────┘
//!            fall / timeout / anomaly
//! ```

use rcin_timer::TimerState;

use crate::config::NO_SIGNAL_US;
use crate::snapshot::ChannelReading;
use crate::validator::PulseValidator;

/// Signal transition observed on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

impl Edge {
    /// The opposite transition.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }

    /// Edge implied by the new level of a line that just changed.
    #[must_use]
    pub const fn from_level(high: bool) -> Self {
        if high { Self::Rising } else { Self::Falling }
    }
}

/// Edge a channel is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedEdge {
    /// Waiting for the start of a pulse.
    #[default]
    Rise,
    /// Waiting for the end of a pulse.
    Fall,
}

/// Result of feeding one event to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Rise recorded and frame-synchronized.
    Armed,
    /// Rise recorded but the preceding low time was implausible; the next
    /// fall will be discarded.
    Unsynchronized {
        /// Measured low time.
        gap_us: u32,
    },
    /// Pulse accepted and published.
    Accepted {
        /// Measured high time.
        width_us: u16,
    },
    /// Pulse outside the accepted window; previous reading kept.
    RejectedWidth {
        /// Measured high time.
        width_us: u32,
    },
    /// Width measured but bound to no reading (a fall after an
    /// unsynchronized rise, or an unmapped train slot); previous reading
    /// kept.
    Discarded {
        /// Measured high time.
        width_us: u32,
    },
    /// Edge arrived in the wrong state; channel forced back to `Rise`.
    SequenceAnomaly {
        /// Edge the channel was waiting for.
        expected: ExpectedEdge,
    },
    /// Channel declared dead; reading reset to the no-signal sentinel.
    TimedOut,
}

impl EdgeOutcome {
    /// Whether the published reading changed.
    #[must_use]
    pub const fn changes_reading(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::TimedOut)
    }

    /// Whether the outcome came from an observed edge (as opposed to a
    /// timeout).
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        !matches!(self, Self::TimedOut)
    }
}

/// State of one logical input channel.
///
/// Only the interrupt context mutates a channel. The consumer sees its
/// [`reading`](Self::reading) through the snapshot.
///
/// # Example
///
/// ```rust
/// use rcin_capture::{EdgeCaptureChannel, EdgeOutcome, PulseValidator};
/// use rcin_timer::TimerState;
///
/// let timer = TimerState {
///     count_resolution: 65_536,
///     prescale_shift: 3,
///     input_clock_hz: 16_000_000,
///     running: true,
/// };
/// let validator = PulseValidator::default();
/// let mut channel = EdgeCaptureChannel::new(0);
///
/// channel.on_rise(10_000, &timer, &validator);
/// let outcome = channel.on_fall(13_000, &timer, &validator);
/// assert_eq!(outcome, EdgeOutcome::Accepted { width_us: 1_500 });
/// assert!(!channel.reading().stale);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCaptureChannel {
    expected_edge: ExpectedEdge,
    rise_timestamp: u32,
    fall_timestamp: u32,
    last_good_width_us: u16,
    stale: bool,
    armed: bool,
    silent_wraps: u8,
    initial_value_us: u16,
}

impl EdgeCaptureChannel {
    /// Create a channel that reports `initial_value_us` (stale) until its
    /// first accepted pulse.
    #[must_use]
    pub const fn new(initial_value_us: u16) -> Self {
        Self {
            expected_edge: ExpectedEdge::Rise,
            rise_timestamp: 0,
            fall_timestamp: 0,
            last_good_width_us: initial_value_us,
            stale: true,
            armed: false,
            silent_wraps: 0,
            initial_value_us,
        }
    }

    /// Feed an edge of either polarity.
    pub fn on_edge(
        &mut self,
        edge: Edge,
        now: u32,
        timer: &TimerState,
        validator: &PulseValidator,
    ) -> EdgeOutcome {
        match edge {
            Edge::Rising => self.on_rise(now, timer, validator),
            Edge::Falling => self.on_fall(now, timer, validator),
        }
    }

    /// Feed a rising edge latched at raw count `now`.
    pub fn on_rise(
        &mut self,
        now: u32,
        timer: &TimerState,
        validator: &PulseValidator,
    ) -> EdgeOutcome {
        let silent_wraps = core::mem::take(&mut self.silent_wraps);
        if self.expected_edge == ExpectedEdge::Fall {
            self.expected_edge = ExpectedEdge::Rise;
            self.armed = false;
            return EdgeOutcome::SequenceAnomaly {
                expected: ExpectedEdge::Fall,
            };
        }

        let gap_us = timer.interval_us(self.fall_timestamp, now, u32::from(silent_wraps));
        self.rise_timestamp = now;
        self.expected_edge = ExpectedEdge::Fall;
        self.armed = validator.accept_gap(gap_us);
        if self.armed {
            EdgeOutcome::Armed
        } else {
            EdgeOutcome::Unsynchronized { gap_us }
        }
    }

    /// Feed a falling edge latched at raw count `now`.
    pub fn on_fall(
        &mut self,
        now: u32,
        timer: &TimerState,
        validator: &PulseValidator,
    ) -> EdgeOutcome {
        let silent_wraps = core::mem::take(&mut self.silent_wraps);
        // The fall is the gap reference for the next rise either way
        self.fall_timestamp = now;
        let armed = core::mem::take(&mut self.armed);
        if self.expected_edge == ExpectedEdge::Rise {
            return EdgeOutcome::SequenceAnomaly {
                expected: ExpectedEdge::Rise,
            };
        }

        self.expected_edge = ExpectedEdge::Rise;
        let width_us = timer.interval_us(self.rise_timestamp, now, u32::from(silent_wraps));
        if !armed {
            return EdgeOutcome::Discarded { width_us };
        }
        self.accept_width(width_us, validator)
    }

    /// Feed a width measured outside the channel, e.g. one slot of a
    /// pulse-position train.
    ///
    /// The channel is left waiting for a rise and its silent-wrap count is
    /// cleared; the width is published under the same window as a
    /// rise/fall pair.
    pub fn on_interval(&mut self, width_us: u32, validator: &PulseValidator) -> EdgeOutcome {
        self.silent_wraps = 0;
        self.expected_edge = ExpectedEdge::Rise;
        self.armed = false;
        self.accept_width(width_us, validator)
    }

    fn accept_width(&mut self, width_us: u32, validator: &PulseValidator) -> EdgeOutcome {
        match u16::try_from(width_us) {
            Ok(width) if validator.accept(width_us) => {
                self.last_good_width_us = width;
                self.stale = false;
                EdgeOutcome::Accepted { width_us: width }
            }
            _ => EdgeOutcome::RejectedWidth { width_us },
        }
    }

    /// Count one timer wrap with no edge on this channel.
    ///
    /// The channel is expired on the wrap that reaches `limit`, and only
    /// then. Returns `true` if that expiry changed the reading. A `limit` of
    /// zero disables the timeout.
    pub fn note_timer_wrap(&mut self, limit: u8) -> bool {
        if limit == 0 || self.silent_wraps >= limit {
            return false;
        }
        self.silent_wraps = self.silent_wraps.saturating_add(1);
        self.silent_wraps == limit && self.expire()
    }

    /// Declare the channel dead: stale, no-signal reading, waiting for a
    /// rise.
    ///
    /// Returns `true` if the reading changed, i.e. the channel was carrying
    /// a signal or its initial value before.
    pub fn expire(&mut self) -> bool {
        let was_live = !self.stale || self.last_good_width_us != NO_SIGNAL_US;
        self.last_good_width_us = NO_SIGNAL_US;
        self.stale = true;
        self.expected_edge = ExpectedEdge::Rise;
        self.armed = false;
        was_live
    }

    /// Return to the freshly-initialized state.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_value_us);
    }

    /// Consumer-visible part of the channel.
    #[must_use]
    pub const fn reading(&self) -> ChannelReading {
        ChannelReading {
            width_us: self.last_good_width_us,
            stale: self.stale,
        }
    }

    /// Edge the channel is waiting for.
    #[must_use]
    pub const fn expected_edge(&self) -> ExpectedEdge {
        self.expected_edge
    }

    /// Raw count of the last recorded rise.
    #[must_use]
    pub const fn rise_timestamp(&self) -> u32 {
        self.rise_timestamp
    }

    /// Raw count of the last recorded fall.
    #[must_use]
    pub const fn fall_timestamp(&self) -> u32 {
        self.fall_timestamp
    }

    /// Last accepted width in microseconds.
    #[must_use]
    pub const fn last_good_width_us(&self) -> u16 {
        self.last_good_width_us
    }

    /// Whether no valid pulse is currently known.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether the pending rise was frame-synchronized.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Timer wraps seen since the last edge.
    #[must_use]
    pub const fn silent_wraps(&self) -> u8 {
        self.silent_wraps
    }
}

impl Default for EdgeCaptureChannel {
    fn default() -> Self {
        Self::new(NO_SIGNAL_US)
    }
}
