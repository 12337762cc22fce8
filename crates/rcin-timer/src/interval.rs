//! Wraparound-safe interval arithmetic.
//!
//! Every width and gap computation in the decoders goes through
//! [`elapsed_ticks`]. The counter is finite and free-running, so `now` may be
//! numerically smaller than the reference even though time moved forward.

/// Forward-only elapsed ticks between two raw counts of a counter with
/// `resolution` distinct values.
///
/// Assumes at most one wrap between the two samples. Inputs outside
/// `0..resolution` are reduced modulo the resolution first.
///
/// # Example
///
/// ```rust
/// use rcin_timer::elapsed_ticks;
///
/// assert_eq!(elapsed_ticks(1_000, 2_500, 65_536), 1_500);
/// assert_eq!(elapsed_ticks(60_000, 2_000, 65_536), 7_536);
/// ```
#[must_use]
pub fn elapsed_ticks(reference: u32, now: u32, resolution: u32) -> u32 {
    if resolution == 0 {
        return now.wrapping_sub(reference);
    }
    let reference = reference % resolution;
    let now = now % resolution;
    if now >= reference {
        now - reference
    } else {
        (resolution - reference) + now
    }
}

/// Snapshot of a timer's configuration, used for pure tick arithmetic.
///
/// Decoders copy this out of the [`TimerService`](crate::TimerService) so the
/// capture path does not need the service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Number of distinct counts per wrap (e.g. 65536 for a 16-bit counter).
    pub count_resolution: u32,
    /// log2 of the prescaler applied to the input clock.
    pub prescale_shift: u8,
    /// Counter input clock before prescaling, in hertz.
    pub input_clock_hz: u32,
    /// Whether the counter clock is enabled.
    pub running: bool,
}

impl TimerState {
    /// Tick rate after prescaling.
    #[must_use]
    pub fn tick_hz(&self) -> u32 {
        self.input_clock_hz >> self.prescale_shift
    }

    /// Elapsed ticks from `reference` to `now` with wraparound correction.
    #[must_use]
    pub fn elapsed_ticks(&self, reference: u32, now: u32) -> u32 {
        elapsed_ticks(reference, now, self.count_resolution)
    }

    /// Convert ticks to microseconds: `ticks * 1_000_000 / tick_hz`.
    ///
    /// Saturates at `u32::MAX`; returns 0 if the tick rate is zero.
    #[must_use]
    pub fn ticks_to_us(&self, ticks: u32) -> u32 {
        let tick_hz = u64::from(self.tick_hz());
        if tick_hz == 0 {
            return 0;
        }
        let us = u64::from(ticks) * 1_000_000 / tick_hz;
        u32::try_from(us).unwrap_or(u32::MAX)
    }

    /// Elapsed microseconds from `reference` to `now`.
    #[must_use]
    pub fn elapsed_us(&self, reference: u32, now: u32) -> u32 {
        self.ticks_to_us(self.elapsed_ticks(reference, now))
    }

    /// Elapsed microseconds from `reference` to `now`, given the number of
    /// overflow notifications handled since `reference` was taken.
    ///
    /// One wrap is only consistent with `now < reference`; one wrap with
    /// `now >= reference`, or more than one wrap, means at least a full
    /// counter period elapsed and the result saturates at `u32::MAX`. Zero
    /// wraps with `now < reference` is a wrap whose notification is still
    /// pending and is corrected like any other wrap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcin_timer::TimerState;
    ///
    /// let timer = TimerState {
    ///     count_resolution: 65_536,
    ///     prescale_shift: 3,
    ///     input_clock_hz: 16_000_000,
    ///     running: true,
    /// };
    /// assert_eq!(timer.interval_us(60_000, 2_000, 1), 3_768);
    /// // Rise at 1000, one wrap, fall at 3000: 67536 ticks, not 2000
    /// assert_eq!(timer.interval_us(1_000, 3_000, 1), u32::MAX);
    /// ```
    #[must_use]
    pub fn interval_us(&self, reference: u32, now: u32, wraps: u32) -> u32 {
        match wraps {
            0 => self.elapsed_us(reference, now),
            1 if now < reference => self.elapsed_us(reference, now),
            _ => u32::MAX,
        }
    }

    /// Duration of one full counter cycle in microseconds.
    #[must_use]
    pub fn period_us(&self) -> u32 {
        self.ticks_to_us(self.count_resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_us_state() -> TimerState {
        TimerState {
            count_resolution: 65_536,
            prescale_shift: 3,
            input_clock_hz: 16_000_000,
            running: true,
        }
    }

    #[test]
    fn test_elapsed_without_wrap() {
        assert_eq!(elapsed_ticks(1_000, 2_500, 65_536), 1_500);
        assert_eq!(elapsed_ticks(7, 7, 65_536), 0);
    }

    #[test]
    fn test_elapsed_with_wrap() {
        assert_eq!(elapsed_ticks(60_000, 2_000, 65_536), 7_536);
        assert_eq!(elapsed_ticks(65_535, 0, 65_536), 1);
    }

    #[test]
    fn test_elapsed_non_power_of_two_resolution() {
        assert_eq!(elapsed_ticks(63_000, 500, 64_001), 1_501);
    }

    #[test]
    fn test_ticks_to_us_half_microsecond() {
        let state = half_us_state();
        assert_eq!(state.tick_hz(), 2_000_000);
        assert_eq!(state.ticks_to_us(7_536), 3_768);
        assert_eq!(state.ticks_to_us(1_500), 750);
        assert_eq!(state.elapsed_us(1_000, 2_500), 750);
        assert_eq!(state.period_us(), 32_768);
    }

    #[test]
    fn test_interval_with_wrap_count() {
        let state = half_us_state();
        assert_eq!(state.interval_us(1_000, 3_000, 0), 1_000);
        assert_eq!(state.interval_us(60_000, 2_000, 0), 3_768);
        assert_eq!(state.interval_us(60_000, 2_000, 1), 3_768);
        assert_eq!(state.interval_us(1_000, 3_000, 1), u32::MAX);
        assert_eq!(state.interval_us(1_000, 1_000, 1), u32::MAX);
        assert_eq!(state.interval_us(60_000, 2_000, 2), u32::MAX);
    }

    #[test]
    fn test_ticks_to_us_zero_rate() {
        let state = TimerState {
            input_clock_hz: 0,
            ..half_us_state()
        };
        assert_eq!(state.ticks_to_us(1_000), 0);
    }
}
