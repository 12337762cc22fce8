//! Channel bank shared between interrupt handlers and the consumer.
//!
//! [`CaptureEngine`] owns every [`EdgeCaptureChannel`] of a decoder, the
//! validator, the published snapshot and the counters. Backends translate
//! hardware events into `(channel, edge, timestamp)` and call into the
//! engine from inside their critical section; the consumer only touches the
//! snapshot.

use core::cell::RefCell;
use core::fmt;

use critical_section::{CriticalSection, Mutex};
use rcin_timer::TimerState;

use crate::channel::{Edge, EdgeCaptureChannel, EdgeOutcome};
use crate::config::{MAX_CHANNELS, ReceiverConfig};
use crate::snapshot::{ChannelReading, ChannelSnapshot};
use crate::stats::{CaptureCounters, CaptureStats};
use crate::validator::PulseValidator;

/// Channel states, validator, snapshot and counters of one decoder.
///
/// # Real-Time Safety
///
/// - `on_edge()`: one channel update, at most one snapshot write
/// - `on_timer_wrap()`: bounded by the channel count
/// - No heap allocation, no blocking
///
/// # Example
///
/// ```rust
/// use rcin_capture::{CaptureEngine, Edge, EdgeOutcome, ReceiverConfig};
/// use rcin_timer::TimerState;
///
/// let engine = CaptureEngine::new(&ReceiverConfig::default());
/// let timer = TimerState {
///     count_resolution: 65_536,
///     prescale_shift: 3,
///     input_clock_hz: 16_000_000,
///     running: true,
/// };
///
/// critical_section::with(|cs| {
///     engine.on_edge(cs, 0, Edge::Rising, 1_000, &timer);
///     engine.on_edge(cs, 0, Edge::Falling, 4_000, &timer);
/// });
/// assert_eq!(engine.reading(0).width_us, 1_500);
/// ```
pub struct CaptureEngine {
    channels: Mutex<RefCell<[EdgeCaptureChannel; MAX_CHANNELS]>>,
    snapshot: ChannelSnapshot,
    counters: CaptureCounters,
    validator: PulseValidator,
    channel_count: usize,
    timeout_wraps: u8,
}

impl CaptureEngine {
    /// Create an engine using the windows of `config`.
    #[must_use]
    pub fn new(config: &ReceiverConfig) -> Self {
        Self::with_validator(config, PulseValidator::from_config(config))
    }

    /// Create an engine with an explicit validator.
    #[must_use]
    pub fn with_validator(config: &ReceiverConfig, validator: PulseValidator) -> Self {
        let channel_count = config.channel_count.min(MAX_CHANNELS);
        Self {
            channels: Mutex::new(RefCell::new(
                [EdgeCaptureChannel::new(config.initial_value_us); MAX_CHANNELS],
            )),
            snapshot: ChannelSnapshot::new(channel_count, config.initial_value_us),
            counters: CaptureCounters::new(),
            validator,
            channel_count,
            timeout_wraps: config.timeout_wraps,
        }
    }

    /// Feed an edge latched at raw count `now` to `channel`.
    ///
    /// Returns `None` for an unconfigured channel.
    pub fn on_edge(
        &self,
        cs: CriticalSection<'_>,
        channel: usize,
        edge: Edge,
        now: u32,
        timer: &TimerState,
    ) -> Option<EdgeOutcome> {
        if channel >= self.channel_count {
            return None;
        }
        let mut channels = self.channels.borrow_ref_mut(cs);
        let state = channels.get_mut(channel)?;
        let outcome = state.on_edge(edge, now, timer, &self.validator);
        self.commit(cs, channel, state.reading(), &outcome);
        Some(outcome)
    }

    /// Feed a width measured by the backend itself to `channel`.
    ///
    /// Returns `None` for an unconfigured channel.
    pub fn on_interval(
        &self,
        cs: CriticalSection<'_>,
        channel: usize,
        width_us: u32,
    ) -> Option<EdgeOutcome> {
        if channel >= self.channel_count {
            return None;
        }
        let mut channels = self.channels.borrow_ref_mut(cs);
        let state = channels.get_mut(channel)?;
        let outcome = state.on_interval(width_us, &self.validator);
        self.commit(cs, channel, state.reading(), &outcome);
        Some(outcome)
    }

    /// Count one timer wrap against every configured channel; channels that
    /// reach the timeout are expired.
    ///
    /// Returns the number of channels whose reading was reset.
    pub fn on_timer_wrap(&self, cs: CriticalSection<'_>) -> usize {
        let mut channels = self.channels.borrow_ref_mut(cs);
        let mut expired = 0;
        for (index, state) in channels.iter_mut().enumerate().take(self.channel_count) {
            if state.note_timer_wrap(self.timeout_wraps) {
                self.commit(cs, index, state.reading(), &EdgeOutcome::TimedOut);
                tracing::debug!(
                    channel = index,
                    "Channel timed out, no edges within deadline"
                );
                expired += 1;
            }
        }
        expired
    }

    /// Declare `channel` dead immediately.
    ///
    /// Returns `None` for an unconfigured channel.
    pub fn expire(&self, cs: CriticalSection<'_>, channel: usize) -> Option<EdgeOutcome> {
        if channel >= self.channel_count {
            return None;
        }
        let mut channels = self.channels.borrow_ref_mut(cs);
        let state = channels.get_mut(channel)?;
        if state.expire() {
            self.commit(cs, channel, state.reading(), &EdgeOutcome::TimedOut);
            tracing::debug!(channel, "Channel timed out, no edges within deadline");
        }
        Some(EdgeOutcome::TimedOut)
    }

    fn commit(
        &self,
        cs: CriticalSection<'_>,
        channel: usize,
        reading: ChannelReading,
        outcome: &EdgeOutcome,
    ) {
        self.counters.record(outcome);
        if outcome.changes_reading() {
            self.snapshot.publish_in(cs, channel, reading);
        }
    }

    /// Return every channel and the snapshot to the initial state. Counters
    /// are kept.
    pub fn reset(&self, cs: CriticalSection<'_>) {
        for state in self.channels.borrow_ref_mut(cs).iter_mut() {
            state.reset();
        }
        self.snapshot.reset_in(cs);
    }

    /// Copy of a channel's internal state.
    #[must_use]
    pub fn channel(&self, cs: CriticalSection<'_>, channel: usize) -> Option<EdgeCaptureChannel> {
        if channel >= self.channel_count {
            return None;
        }
        self.channels.borrow_ref(cs).get(channel).copied()
    }

    /// Published reading of `channel`, torn-free.
    #[must_use]
    pub fn reading(&self, channel: usize) -> ChannelReading {
        self.snapshot.read(channel)
    }

    /// Published readings.
    #[must_use]
    pub fn snapshot(&self) -> &ChannelSnapshot {
        &self.snapshot
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CaptureStats {
        self.counters.snapshot()
    }

    /// Live counters.
    #[must_use]
    pub fn counters(&self) -> &CaptureCounters {
        &self.counters
    }

    /// Validator applied to every pulse.
    #[must_use]
    pub fn validator(&self) -> &PulseValidator {
        &self.validator
    }

    /// Number of configured channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Silent wraps before a channel is expired.
    #[must_use]
    pub fn timeout_wraps(&self) -> u8 {
        self.timeout_wraps
    }
}

impl fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("channel_count", &self.channel_count)
            .field("validator", &self.validator)
            .field("timeout_wraps", &self.timeout_wraps)
            .field("snapshot", &self.snapshot)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
