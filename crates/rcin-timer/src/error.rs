//! Error types for timer configuration.

use thiserror::Error;

/// Errors that can occur while configuring a timer.
///
/// Only configuration-time conditions are errors. A period that cannot be
/// represented at any prescaler is *not* an error: it is clamped and reported
/// through [`TimerSetup::clamped`](crate::TimerSetup::clamped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Requested maximum period was zero.
    #[error("Timer period must be greater than zero")]
    ZeroPeriod,

    /// Counter reported a zero input clock.
    #[error("Timer input clock must be greater than zero")]
    ZeroClock,

    /// Counter reported a resolution too small to count anything.
    #[error("Counter resolution {0} is too small (need at least 2)")]
    InvalidResolution(u32),

    /// Prescaler divides the input clock down to zero.
    #[error("Prescaler /{divisor} leaves no tick rate for a {clock_hz} Hz clock")]
    PrescalerTooLarge {
        /// Input clock in hertz.
        clock_hz: u32,
        /// Prescaler divisor.
        divisor: u32,
    },
}

/// A specialized `Result` type for timer operations.
pub type TimerResult<T> = core::result::Result<T, TimerError>;
