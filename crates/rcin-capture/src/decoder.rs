//! Consumer-facing decoder capability.

use crate::error::CaptureResult;
use crate::snapshot::ChannelReading;
use crate::stats::CaptureStats;

/// An RC receiver decoder as seen by the main loop.
///
/// Implemented by each hardware strategy. Interrupt entry points are
/// strategy-specific and not part of this trait.
///
/// # Implementation Requirements
///
/// 1. `initialize()` MUST configure the timer and arm the first capture; it
///    is the only fallible operation
/// 2. `reading()` and `get_channel_value()` MUST NOT block or fail and MUST
///    be torn-free with respect to interrupt handlers
/// 3. Out-of-range channels MUST read as the configured initial value
pub trait ReceiverDecoder {
    /// Configure hardware and start capturing.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not fit the hardware or the
    /// timer cannot be configured.
    fn initialize(&mut self) -> CaptureResult<()>;

    /// Number of configured channels.
    fn channel_count(&self) -> usize;

    /// Width and staleness of `channel`.
    fn reading(&self, channel: usize) -> ChannelReading;

    /// Last accepted pulse width of `channel` in microseconds.
    fn get_channel_value(&self, channel: usize) -> u16 {
        self.reading(channel).width_us
    }

    /// Whether `channel` currently carries no valid signal.
    fn is_stale(&self, channel: usize) -> bool {
        self.reading(channel).stale
    }

    /// Override a channel's value. Receivers are input-only, so the
    /// default does nothing.
    fn set_channel_value(&self, _channel: usize, _value_us: u16) {}

    /// Capture counters.
    fn stats(&self) -> CaptureStats;
}
