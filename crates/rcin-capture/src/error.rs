//! Error types for receiver configuration.

use rcin_timer::TimerError;
use thiserror::Error;

/// Errors that can occur while configuring or initializing a decoder.
///
/// Runtime capture faults (implausible widths, out-of-order edges, dead
/// channels) are never errors; they are absorbed by the channel state machine
/// and counted in [`CaptureStats`](crate::CaptureStats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Channel count is zero or above the supported maximum.
    #[error("Channel count {count} is outside 1..={max}")]
    InvalidChannelCount {
        /// Requested channel count.
        count: usize,
        /// Largest supported channel count.
        max: usize,
    },

    /// A channel is bound to a pin the backend cannot address.
    #[error("Channel {channel} bound to pin {pin}, backend supports pins below {limit}")]
    PinOutOfRange {
        /// Logical channel index.
        channel: usize,
        /// Requested pin or capture unit.
        pin: u8,
        /// Exclusive upper bound accepted by the backend.
        limit: u8,
    },

    /// Two channels are bound to the same pin.
    #[error("Pin {pin} is bound to more than one channel")]
    DuplicatePin {
        /// Pin or capture unit bound twice.
        pin: u8,
    },

    /// Window minimum exceeds its maximum, or a pulse window does not fit in
    /// a 16-bit reading.
    #[error("Invalid window {min_us}..={max_us} us")]
    InvalidWindow {
        /// Lower bound in microseconds.
        min_us: u32,
        /// Upper bound in microseconds.
        max_us: u32,
    },

    /// Dead-channel timeout of zero wraps.
    #[error("Timeout must be at least one timer wrap")]
    ZeroTimeout,

    /// Timer could not be configured.
    #[error("Timer configuration failed: {0}")]
    Timer(#[from] TimerError),
}

impl CaptureError {
    /// Create an invalid window error.
    #[must_use]
    pub fn invalid_window(min_us: u32, max_us: u32) -> Self {
        Self::InvalidWindow { min_us, max_us }
    }

    /// Create a pin out of range error.
    #[must_use]
    pub fn pin_out_of_range(channel: usize, pin: u8, limit: u8) -> Self {
        Self::PinOutOfRange {
            channel,
            pin,
            limit,
        }
    }
}

/// A specialized `Result` type for capture configuration.
pub type CaptureResult<T> = core::result::Result<T, CaptureError>;
