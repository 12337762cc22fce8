//! Timer service wrapping a free-running counter.

use portable_atomic::{AtomicBool, Ordering};

use crate::counter::FreeRunningCounter;
use crate::error::{TimerError, TimerResult};
use crate::interval::TimerState;
use crate::prescale::{Prescaler, TimerSetup, select_prescaler};

/// Maximum number of re-reads when resolving a read/increment race.
pub const STABLE_READ_ATTEMPTS: u32 = 4;

/// Free-running timer service.
///
/// Owns a [`FreeRunningCounter`] and tracks the prescale and wrap settings
/// needed to convert raw counts to microseconds.
///
/// # Real-Time Safety
///
/// - `read_now_torn()`: single register read, for interrupt context
/// - `read_now_safe()`: critical section plus a bounded double-read
/// - `start()`, `stop()`, `reset()`: single register writes
///
/// # Example
///
/// ```rust
/// use rcin_timer::{SimulatedCounter, TimerService};
///
/// let mut timer = TimerService::new(SimulatedCounter::new(16_000_000, 65_536));
/// let setup = timer.init(20_000).expect("valid period");
/// assert!(!setup.clamped);
///
/// timer.start();
/// timer.counter().advance(4_000);
/// assert_eq!(timer.read_now_safe(), 4_000);
/// assert_eq!(timer.micros_safe(), 2_000);
/// ```
#[derive(Debug)]
pub struct TimerService<C> {
    counter: C,
    setup: TimerSetup,
    count_resolution: u32,
    running: AtomicBool,
}

impl<C: FreeRunningCounter> TimerService<C> {
    /// Wrap a counter. The counter is left stopped and unconfigured until
    /// [`init`](Self::init) or [`init_free_running`](Self::init_free_running).
    pub fn new(counter: C) -> Self {
        let resolution = counter.resolution();
        Self {
            counter,
            setup: TimerSetup {
                prescaler: Prescaler::Div1,
                top: resolution.saturating_sub(1),
                clamped: false,
            },
            count_resolution: resolution,
            running: AtomicBool::new(false),
        }
    }

    /// Configure the counter so one full cycle lasts at least `max_period_us`
    /// at the finest prescaler that fits.
    ///
    /// The counter is stopped; call [`start`](Self::start) afterwards. If the
    /// period cannot be represented it is clamped and the returned setup has
    /// `clamped == true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the period or input clock is zero, or the counter
    /// resolution is unusable.
    pub fn init(&mut self, max_period_us: u32) -> TimerResult<TimerSetup> {
        let setup = select_prescaler(
            self.counter.input_clock_hz(),
            max_period_us,
            self.counter.resolution(),
        )?;
        if setup.clamped {
            tracing::warn!(
                max_period_us,
                top = setup.top,
                prescaler = setup.prescaler.divisor(),
                "Requested timer period not representable, clamped to coarsest resolution"
            );
        }
        self.configure(setup);
        tracing::info!(
            max_period_us,
            top = setup.top,
            prescaler = setup.prescaler.divisor(),
            "Timer configured"
        );
        Ok(setup)
    }

    /// Configure the counter to run its full hardware range at a fixed
    /// prescaler.
    ///
    /// # Errors
    ///
    /// Returns an error if the input clock is zero, the prescaler divides it
    /// to nothing, or the counter resolution is unusable.
    pub fn init_free_running(&mut self, prescaler: Prescaler) -> TimerResult<TimerSetup> {
        let clock_hz = self.counter.input_clock_hz();
        let resolution = self.counter.resolution();
        if clock_hz == 0 {
            return Err(TimerError::ZeroClock);
        }
        if resolution < 2 {
            return Err(TimerError::InvalidResolution(resolution));
        }
        if clock_hz >> prescaler.shift() == 0 {
            return Err(TimerError::PrescalerTooLarge {
                clock_hz,
                divisor: prescaler.divisor(),
            });
        }
        let setup = TimerSetup {
            prescaler,
            top: resolution - 1,
            clamped: false,
        };
        self.configure(setup);
        tracing::info!(
            prescaler = prescaler.divisor(),
            resolution,
            "Timer configured free-running"
        );
        Ok(setup)
    }

    fn configure(&mut self, setup: TimerSetup) {
        self.counter.disable_clock();
        self.running.store(false, Ordering::Release);
        self.counter.set_top(setup.top);
        self.setup = setup;
        self.count_resolution = setup.count_resolution();
    }

    /// Enable the counter clock.
    pub fn start(&self) {
        self.counter.enable_clock(self.setup.prescaler);
        self.running.store(true, Ordering::Release);
    }

    /// Disable the counter clock; the count is frozen.
    pub fn stop(&self) {
        self.counter.disable_clock();
        self.running.store(false, Ordering::Release);
    }

    /// Set the count to zero.
    pub fn reset(&self) {
        self.counter.set_count(0);
    }

    /// Arm the hardware overflow interrupt. Each wrap is then forwarded to the
    /// owning decoder by the board's interrupt handler.
    pub fn enable_overflow_notification(&self) {
        self.counter.set_overflow_interrupt(true);
    }

    /// Disarm the hardware overflow interrupt.
    pub fn disable_overflow_notification(&self) {
        self.counter.set_overflow_interrupt(false);
    }

    /// Raw count, for use inside an interrupt handler where the critical
    /// section is already held.
    #[must_use]
    pub fn read_now_torn(&self) -> u32 {
        self.counter.count()
    }

    /// Raw count, for use from the main loop.
    ///
    /// Runs inside a critical section that restores the previous interrupt
    /// state on exit, and samples the counter until two consecutive reads
    /// agree. After [`STABLE_READ_ATTEMPTS`] disagreeing pairs the latest
    /// sample is returned.
    #[must_use]
    pub fn read_now_safe(&self) -> u32 {
        critical_section::with(|_cs| self.read_stable())
    }

    fn read_stable(&self) -> u32 {
        let mut previous = self.counter.count();
        for _ in 0..STABLE_READ_ATTEMPTS {
            let current = self.counter.count();
            if current == previous {
                return current;
            }
            previous = current;
        }
        previous
    }

    /// Microseconds since the last reset, read from interrupt context.
    #[must_use]
    pub fn micros_torn(&self) -> u32 {
        self.ticks_to_us(self.read_now_torn())
    }

    /// Microseconds since the last reset, read from the main loop.
    #[must_use]
    pub fn micros_safe(&self) -> u32 {
        self.ticks_to_us(self.read_now_safe())
    }

    /// Convert ticks to microseconds at the configured prescaler.
    #[must_use]
    pub fn ticks_to_us(&self, ticks: u32) -> u32 {
        self.state().ticks_to_us(ticks)
    }

    /// Wraparound-safe elapsed ticks from `reference` to `now`.
    #[must_use]
    pub fn elapsed_ticks(&self, reference: u32, now: u32) -> u32 {
        self.state().elapsed_ticks(reference, now)
    }

    /// Current timer state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        TimerState {
            count_resolution: self.count_resolution,
            prescale_shift: self.setup.prescaler.shift(),
            input_clock_hz: self.counter.input_clock_hz(),
            running: self.running.load(Ordering::Acquire),
        }
    }

    /// The applied setup.
    #[must_use]
    pub fn setup(&self) -> TimerSetup {
        self.setup
    }

    /// Whether the counter clock is enabled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The wrapped counter.
    #[must_use]
    pub fn counter(&self) -> &C {
        &self.counter
    }
}
