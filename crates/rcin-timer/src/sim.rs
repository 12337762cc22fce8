//! Simulated counter for host testing.
//!
//! This module provides `SimulatedCounter`, a software implementation of
//! [`FreeRunningCounter`] whose time only moves when the test says so.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::counter::FreeRunningCounter;
use crate::prescale::Prescaler;

/// Software counter driven explicitly by [`advance`](Self::advance).
///
/// Counting honours the configured `top` and clock gating: a stopped counter
/// ignores `advance`. A read skew can be armed to make the count move between
/// consecutive reads, which reproduces the read/increment race the timer
/// service has to resolve.
///
/// # Example
///
/// ```rust
/// use rcin_timer::{FreeRunningCounter, Prescaler, SimulatedCounter};
///
/// let counter = SimulatedCounter::new(16_000_000, 65_536);
/// counter.set_top(999);
/// counter.enable_clock(Prescaler::Div8);
///
/// let wraps = counter.advance(2_500);
/// assert_eq!(wraps, 2);
/// assert_eq!(counter.count(), 500);
/// ```
#[derive(Debug)]
pub struct SimulatedCounter {
    resolution: u32,
    clock_hz: u32,
    count: AtomicU32,
    top: AtomicU32,
    clock_enabled: AtomicBool,
    prescale_shift: AtomicU8,
    overflow_interrupt: AtomicBool,
    skew_step: AtomicU32,
    skew_reads: AtomicU32,
}

impl SimulatedCounter {
    /// Create a stopped counter with `resolution` distinct values clocked at
    /// `clock_hz`. The wrap target starts at the full range.
    #[must_use]
    pub fn new(clock_hz: u32, resolution: u32) -> Self {
        Self {
            resolution,
            clock_hz,
            count: AtomicU32::new(0),
            top: AtomicU32::new(resolution.saturating_sub(1)),
            clock_enabled: AtomicBool::new(false),
            prescale_shift: AtomicU8::new(0),
            overflow_interrupt: AtomicBool::new(false),
            skew_step: AtomicU32::new(0),
            skew_reads: AtomicU32::new(0),
        }
    }

    /// A 16-bit counter on a 16 MHz clock.
    #[must_use]
    pub fn avr_16bit() -> Self {
        Self::new(16_000_000, 65_536)
    }

    fn period(&self) -> u64 {
        u64::from(self.top.load(Ordering::Acquire)) + 1
    }

    /// Let `ticks` prescaled ticks elapse.
    ///
    /// Returns the number of wraps that occurred, i.e. the number of overflow
    /// notifications the hardware would have raised. Returns 0 when the clock
    /// is gated off.
    pub fn advance(&self, ticks: u32) -> u32 {
        if !self.clock_enabled.load(Ordering::Acquire) {
            return 0;
        }
        let period = self.period();
        let total = u64::from(self.count.load(Ordering::Acquire)) + u64::from(ticks);
        let wraps = total / period;
        let remainder = total % period;
        self.count
            .store(u32::try_from(remainder).unwrap_or(0), Ordering::Release);
        u32::try_from(wraps).unwrap_or(u32::MAX)
    }

    /// Make the next `reads` calls to `count()` advance the counter by `step`
    /// after sampling (only while the clock runs).
    pub fn set_read_skew(&self, step: u32, reads: u32) {
        self.skew_step.store(step, Ordering::Release);
        self.skew_reads.store(reads, Ordering::Release);
    }

    /// Current wrap target.
    #[must_use]
    pub fn top(&self) -> u32 {
        self.top.load(Ordering::Acquire)
    }

    /// Whether the clock is gated on.
    #[must_use]
    pub fn is_clock_enabled(&self) -> bool {
        self.clock_enabled.load(Ordering::Acquire)
    }

    /// Prescaler last used to enable the clock.
    #[must_use]
    pub fn prescaler(&self) -> Option<Prescaler> {
        Prescaler::from_shift(self.prescale_shift.load(Ordering::Acquire))
    }

    /// Whether the overflow interrupt is enabled.
    #[must_use]
    pub fn overflow_interrupt_enabled(&self) -> bool {
        self.overflow_interrupt.load(Ordering::Acquire)
    }
}

impl FreeRunningCounter for SimulatedCounter {
    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn input_clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn count(&self) -> u32 {
        let value = self.count.load(Ordering::Acquire);
        let remaining = self.skew_reads.load(Ordering::Acquire);
        if remaining > 0 && self.clock_enabled.load(Ordering::Acquire) {
            self.skew_reads.store(remaining - 1, Ordering::Release);
            let step = u64::from(self.skew_step.load(Ordering::Acquire));
            let next = (u64::from(value) + step) % self.period();
            self.count
                .store(u32::try_from(next).unwrap_or(0), Ordering::Release);
        }
        value
    }

    fn set_count(&self, value: u32) {
        let wrapped = u64::from(value) % self.period();
        self.count
            .store(u32::try_from(wrapped).unwrap_or(0), Ordering::Release);
    }

    fn set_top(&self, top: u32) {
        let top = top.min(self.resolution.saturating_sub(1));
        self.top.store(top, Ordering::Release);
        if self.count.load(Ordering::Acquire) > top {
            self.count.store(0, Ordering::Release);
        }
    }

    fn enable_clock(&self, prescaler: Prescaler) {
        self.prescale_shift
            .store(prescaler.shift(), Ordering::Release);
        self.clock_enabled.store(true, Ordering::Release);
    }

    fn disable_clock(&self) {
        self.clock_enabled.store(false, Ordering::Release);
    }

    fn set_overflow_interrupt(&self, enabled: bool) {
        self.overflow_interrupt.store(enabled, Ordering::Release);
    }
}

impl Default for SimulatedCounter {
    fn default() -> Self {
        Self::avr_16bit()
    }
}
