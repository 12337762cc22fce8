//! Round-robin decoder using one external interrupt at a time.
//!
//! Only the active channel's pin has an interrupt attached. A rise restarts
//! the timer from zero and re-attaches the pin for its fall; the fall
//! measures the width, hands the interrupt to the next channel and restarts
//! the timer. A timer wrap means the active channel produced nothing for a
//! full period, so it is declared dead and the rotation moves on.
//!
//! ```text
//!  ch0: ──┐rise┌──fall──► ch1: ──┐rise┌──fall──► ch2 ...
//!         └────┘                  └────┘
//!  overflow on any channel ──► expire, advance
//! ```

use core::cell::Cell;
use core::fmt;

use critical_section::{CriticalSection, Mutex};
use rcin_capture::{
    CaptureEngine, CaptureResult, CaptureStats, ChannelReading, Edge, PulseValidator,
    ReceiverConfig, ReceiverDecoder,
};
use rcin_timer::{FreeRunningCounter, Prescaler, TimerService};

use crate::hal::PinInterrupts;
use crate::scheduler::RoundRobin;

/// Decoder sharing one timer between channels in turn.
///
/// Frame-gap checks do not apply: the gap before a channel's rise spans the
/// other channels' turns, so only the pulse window is used.
///
/// # Interrupt Entry Points
///
/// - `on_pin_edge(pin, edge)`: from the external interrupt of `pin`
/// - `on_timer_overflow()`: from the timer's overflow interrupt
///
/// # Example
///
/// ```rust
/// use rcin_backends::sim::SimulatedPinInterrupts;
/// use rcin_backends::time_division::TimeDivisionDecoder;
/// use rcin_capture::{Edge, ReceiverConfig, ReceiverDecoder};
/// use rcin_timer::SimulatedCounter;
///
/// let counter = SimulatedCounter::avr_16bit();
/// let pins = SimulatedPinInterrupts::new();
/// let config = ReceiverConfig::builder().pins(&[2, 3]).build().expect("valid config");
/// let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config).expect("valid config");
/// decoder.initialize().expect("timer configured");
/// assert_eq!(pins.attached(2), Some(Edge::Rising));
///
/// decoder.on_pin_edge(2, Edge::Rising);
/// counter.advance(3_400);
/// decoder.on_pin_edge(2, Edge::Falling);
///
/// assert_eq!(decoder.get_channel_value(0), 1_700);
/// assert_eq!(decoder.active_channel(), 1);
/// assert_eq!(pins.attached(3), Some(Edge::Rising));
/// ```
pub struct TimeDivisionDecoder<C, I> {
    timer: TimerService<C>,
    pins: I,
    config: ReceiverConfig,
    engine: CaptureEngine,
    cursor: Mutex<Cell<RoundRobin>>,
}

impl<C: FreeRunningCounter, I: PinInterrupts> TimeDivisionDecoder<C, I> {
    /// Create a decoder. Hardware is untouched until
    /// [`initialize`](ReceiverDecoder::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or binds a pin
    /// without an external interrupt.
    pub fn new(counter: C, pins: I, config: ReceiverConfig) -> CaptureResult<Self> {
        config.validate()?;
        config.validate_pins_below(pins.pin_count())?;
        let validator = PulseValidator::from_config(&config).without_gap();
        Ok(Self {
            timer: TimerService::new(counter),
            pins,
            engine: CaptureEngine::with_validator(&config, validator),
            cursor: Mutex::new(Cell::new(RoundRobin::new(config.channel_count))),
            config,
        })
    }

    /// External interrupt entry point. Edges from any pin other than the
    /// active channel's are ignored.
    pub fn on_pin_edge(&self, pin: u8, edge: Edge) {
        critical_section::with(|cs| {
            let cursor = self.cursor.borrow(cs).get();
            let active = cursor.active();
            if self.config.pin(active) != Some(pin) {
                return;
            }
            match edge {
                Edge::Rising => {
                    self.timer.stop();
                    self.timer.reset();
                    self.timer.start();
                    let now = self.timer.read_now_torn();
                    self.engine
                        .on_edge(cs, active, Edge::Rising, now, &self.timer.state());
                    self.pins.detach(pin);
                    self.pins.attach(pin, Edge::Falling);
                }
                Edge::Falling => {
                    let now = self.timer.read_now_torn();
                    self.engine
                        .on_edge(cs, active, Edge::Falling, now, &self.timer.state());
                    self.timer.stop();
                    self.advance(cs, cursor);
                    self.timer.reset();
                    self.timer.start();
                }
            }
        });
    }

    /// Timer overflow interrupt entry point.
    pub fn on_timer_overflow(&self) {
        critical_section::with(|cs| {
            let cursor = self.cursor.borrow(cs).get();
            self.engine.expire(cs, cursor.active());
            self.advance(cs, cursor);
        });
    }

    fn advance(&self, cs: CriticalSection<'_>, cursor: RoundRobin) {
        if let Some(pin) = self.config.pin(cursor.active()) {
            self.pins.detach(pin);
        }
        let next = cursor.advanced();
        self.cursor.borrow(cs).set(next);
        if let Some(pin) = self.config.pin(next.active()) {
            self.pins.attach(pin, Edge::Rising);
        }
    }

    /// Channel currently holding the interrupt.
    #[must_use]
    pub fn active_channel(&self) -> usize {
        critical_section::with(|cs| self.cursor.borrow(cs).get().active())
    }

    /// Channel bank.
    #[must_use]
    pub fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    /// Timer service.
    #[must_use]
    pub fn timer(&self) -> &TimerService<C> {
        &self.timer
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }
}

impl<C: FreeRunningCounter, I: PinInterrupts> ReceiverDecoder for TimeDivisionDecoder<C, I> {
    fn initialize(&mut self) -> CaptureResult<()> {
        self.timer.init_free_running(Prescaler::Div8)?;
        self.timer.enable_overflow_notification();
        for (_, pin) in self.config.bindings() {
            self.pins.detach(pin);
        }
        let cursor = RoundRobin::new(self.config.channel_count);
        critical_section::with(|cs| {
            self.engine.reset(cs);
            self.cursor.borrow(cs).set(cursor);
        });
        if let Some(pin) = self.config.pin(cursor.active()) {
            self.pins.attach(pin, Edge::Rising);
        }
        self.timer.reset();
        self.timer.start();
        tracing::info!(
            channels = self.config.channel_count,
            "Time-division decoder initialized"
        );
        Ok(())
    }

    fn channel_count(&self) -> usize {
        self.config.channel_count
    }

    fn reading(&self, channel: usize) -> ChannelReading {
        self.engine.reading(channel)
    }

    fn stats(&self) -> CaptureStats {
        self.engine.stats()
    }
}

impl<C, I> fmt::Debug for TimeDivisionDecoder<C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeDivisionDecoder")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
