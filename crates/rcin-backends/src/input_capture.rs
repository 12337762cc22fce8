//! Per-pin capture-compare decoder.
//!
//! Each channel owns a capture unit of one shared timer. The hardware
//! latches the count on the armed edge, so interrupt latency does not skew
//! the timestamp. After every capture the unit's polarity is flipped to
//! wait for the opposite edge.

use core::fmt;

use rcin_capture::{
    CENTER_US, CaptureEngine, CaptureResult, CaptureStats, ChannelReading, Edge, MAX_CHANNELS,
    PulseWindow, ReceiverConfig, ReceiverDecoder,
};
use rcin_timer::{FreeRunningCounter, TimerService, TimerSetup};

use crate::hal::CaptureUnits;

/// Timer period requested at initialization, in microseconds.
pub const CAPTURE_PERIOD_US: u32 = 32_000;

/// Eight units, capture pulse window, readings centred until measured.
#[must_use]
pub fn default_config() -> ReceiverConfig {
    ReceiverConfig {
        channel_count: MAX_CHANNELS,
        pulse_window: PulseWindow::CAPTURE,
        initial_value_us: CENTER_US,
        ..ReceiverConfig::default()
    }
}

/// Decoder driven by hardware input capture.
///
/// # Interrupt Entry Points
///
/// - `on_capture(unit)`: from the capture interrupt of `unit`
/// - `on_timer_overflow()`: from the shared timer's overflow interrupt
///
/// # Interrupt Ordering
///
/// A count latched just before a wrap but serviced after
/// `on_timer_overflow()` is indistinguishable from a pulse lasting a full
/// period, and is rejected; the previous reading stays published. Give the
/// capture interrupts priority over the overflow interrupt where the
/// hardware allows it.
///
/// # Example
///
/// ```rust
/// use rcin_backends::input_capture::{InputCaptureDecoder, default_config};
/// use rcin_backends::sim::SimulatedCaptureUnits;
/// use rcin_capture::ReceiverDecoder;
/// use rcin_timer::SimulatedCounter;
///
/// let counter = SimulatedCounter::avr_16bit();
/// let units = SimulatedCaptureUnits::new();
/// let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config()).expect("valid config");
/// decoder.initialize().expect("timer configured");
/// assert_eq!(decoder.get_channel_value(4), 1_500);
///
/// units.latch(4, 63_000);
/// decoder.on_capture(4);
/// units.latch(4, 2_400);
/// decoder.on_capture(4);
///
/// // 3401 ticks across the 64001-count wrap at 0.5 us per tick
/// assert_eq!(decoder.get_channel_value(4), 1_700);
/// ```
pub struct InputCaptureDecoder<C, U> {
    timer: TimerService<C>,
    units: U,
    config: ReceiverConfig,
    engine: CaptureEngine,
}

impl<C: FreeRunningCounter, U: CaptureUnits> InputCaptureDecoder<C, U> {
    /// Create a decoder. Hardware is untouched until
    /// [`initialize`](ReceiverDecoder::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or binds a
    /// nonexistent capture unit.
    pub fn new(counter: C, units: U, config: ReceiverConfig) -> CaptureResult<Self> {
        config.validate()?;
        config.validate_pins_below(units.unit_count())?;
        Ok(Self {
            timer: TimerService::new(counter),
            units,
            engine: CaptureEngine::new(&config),
            config,
        })
    }

    /// Capture interrupt entry point.
    pub fn on_capture(&self, unit: u8) {
        let Some(channel) = self.config.channel_for_pin(unit) else {
            return;
        };
        critical_section::with(|cs| {
            let captured = self.units.captured(unit);
            let edge = self.units.polarity(unit);
            self.engine
                .on_edge(cs, channel, edge, captured, &self.timer.state());
            self.units.set_polarity(unit, edge.inverted());
        });
    }

    /// Timer overflow interrupt entry point.
    pub fn on_timer_overflow(&self) {
        critical_section::with(|cs| {
            self.engine.on_timer_wrap(cs);
        });
    }

    /// Timer setup applied by the last initialization.
    #[must_use]
    pub fn timer_setup(&self) -> TimerSetup {
        self.timer.setup()
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

impl<C: FreeRunningCounter, U: CaptureUnits> ReceiverDecoder for InputCaptureDecoder<C, U> {
    fn initialize(&mut self) -> CaptureResult<()> {
        let setup = self.timer.init(CAPTURE_PERIOD_US)?;
        self.timer.enable_overflow_notification();
        critical_section::with(|cs| self.engine.reset(cs));
        for (_, unit) in self.config.bindings() {
            self.units.enable(unit, Edge::Rising);
        }
        self.timer.reset();
        self.timer.start();
        tracing::info!(
            channels = self.config.channel_count,
            top = setup.top,
            prescaler = setup.prescaler.divisor(),
            "Input-capture decoder initialized"
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

impl<C, U> fmt::Debug for InputCaptureDecoder<C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputCaptureDecoder")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
