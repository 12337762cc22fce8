//! Prescaler selection for a requested counter period.

use crate::error::{TimerError, TimerResult};

/// Clock divider applied in front of the counter.
///
/// The set matches the dividers available on 16-bit AVR-class timers. Each
/// divider is a power of two, so conversions use its shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Prescaler {
    /// No division, full input clock.
    #[default]
    Div1 = 0,
    /// Input clock / 8.
    Div8 = 3,
    /// Input clock / 64.
    Div64 = 6,
    /// Input clock / 256.
    Div256 = 8,
    /// Input clock / 1024.
    Div1024 = 10,
}

impl Prescaler {
    /// All prescalers, finest first.
    pub const ALL: [Self; 5] = [
        Self::Div1,
        Self::Div8,
        Self::Div64,
        Self::Div256,
        Self::Div1024,
    ];

    /// Coarsest available prescaler.
    pub const COARSEST: Self = Self::Div1024;

    /// log2 of the divider.
    #[must_use]
    pub const fn shift(self) -> u8 {
        self as u8
    }

    /// The divider itself.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        1 << self.shift()
    }

    /// Look up a prescaler by its shift.
    #[must_use]
    pub fn from_shift(shift: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.shift() == shift)
    }
}

impl core::fmt::Display for Prescaler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "/{}", self.divisor())
    }
}

/// Outcome of configuring a timer for a requested period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSetup {
    /// Selected prescaler.
    pub prescaler: Prescaler,
    /// Wrap target: the counter runs `0..=top`.
    pub top: u32,
    /// The requested period did not fit and was clamped to the longest
    /// representable one at the coarsest prescaler.
    pub clamped: bool,
}

impl TimerSetup {
    /// Number of distinct counts in one wrap cycle.
    #[must_use]
    pub fn count_resolution(&self) -> u32 {
        self.top.saturating_add(1)
    }

    /// Duration of one full wrap cycle in microseconds.
    #[must_use]
    pub fn period_us(&self, clock_hz: u32) -> u64 {
        let tick_hz = u64::from(clock_hz >> self.prescaler.shift());
        if tick_hz == 0 {
            return 0;
        }
        u64::from(self.count_resolution()) * 1_000_000 / tick_hz
    }
}

/// Select the smallest prescaler whose scaled cycle count fits the counter.
///
/// `cycles = clock_hz * max_period_us / 1_000_000`; the first prescaler for
/// which `cycles >> shift < resolution` wins and `top` is the scaled count.
/// When nothing fits, `top` is clamped to `resolution - 1` at
/// [`Prescaler::COARSEST`] and the returned setup is flagged `clamped`.
///
/// # Errors
///
/// Returns an error if the period or clock is zero, or the resolution is
/// below two counts.
pub fn select_prescaler(
    clock_hz: u32,
    max_period_us: u32,
    resolution: u32,
) -> TimerResult<TimerSetup> {
    if max_period_us == 0 {
        return Err(TimerError::ZeroPeriod);
    }
    if clock_hz == 0 {
        return Err(TimerError::ZeroClock);
    }
    if resolution < 2 {
        return Err(TimerError::InvalidResolution(resolution));
    }

    let cycles = u64::from(clock_hz) * u64::from(max_period_us) / 1_000_000;

    for prescaler in Prescaler::ALL {
        let scaled = cycles >> prescaler.shift();
        if scaled < u64::from(resolution) {
            // scaled < resolution <= u32::MAX
            let top = u32::try_from(scaled).unwrap_or(resolution - 1).max(1);
            return Ok(TimerSetup {
                prescaler,
                top,
                clamped: false,
            });
        }
    }

    Ok(TimerSetup {
        prescaler: Prescaler::COARSEST,
        top: resolution - 1,
        clamped: true,
    })
}
