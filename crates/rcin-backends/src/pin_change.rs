//! Always-armed decoder on a shared pin-change interrupt.
//!
//! One interrupt covers a whole 8-line port. Each entry reads the timer,
//! reads the port, and XORs against the previous levels to find which lines
//! moved; every moved line is dispatched to its channel with the edge
//! implied by its new level.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;
use rcin_capture::{
    CaptureEngine, CaptureResult, CaptureStats, ChannelReading, Edge, PulseWindow, ReceiverConfig,
    ReceiverDecoder,
};
use rcin_timer::{FreeRunningCounter, Prescaler, TimerService};

use crate::hal::PinChangePort;

/// Lines on one pin-change port.
pub const PORT_WIDTH: u8 = 8;

/// Line order used by the reference wiring: channel 0 on line 1, channel 3
/// on line 0.
pub const DEFAULT_PIN_ORDER: [u8; 8] = [1, 2, 3, 0, 4, 5, 6, 7];

/// Six channels on [`DEFAULT_PIN_ORDER`], PWM pulse window, 12-24 ms frame
/// gap.
#[must_use]
pub fn default_config() -> ReceiverConfig {
    let mut pins = [0; rcin_capture::MAX_CHANNELS];
    for (slot, pin) in pins.iter_mut().zip(DEFAULT_PIN_ORDER) {
        *slot = pin;
    }
    ReceiverConfig {
        channel_count: 6,
        pins,
        pulse_window: PulseWindow::PWM,
        gap_window: Some(PulseWindow::PWM_FRAME_GAP),
        ..ReceiverConfig::default()
    }
}

/// Decoder scanning a pin-change port bitmask.
///
/// The timer runs its full range at /8 (0.5 us per tick on a 16 MHz part).
/// Rises are checked against the frame gap when the configuration carries a
/// gap window, and channels silent for `timeout_wraps` timer wraps are
/// declared dead.
///
/// # Interrupt Entry Points
///
/// - `on_pin_change()`: from the port's pin-change interrupt
/// - `on_timer_overflow()`: from the timer's overflow interrupt
///
/// # Example
///
/// ```rust
/// use rcin_backends::pin_change::{PinChangeDecoder, default_config};
/// use rcin_backends::sim::SimulatedPort;
/// use rcin_capture::ReceiverDecoder;
/// use rcin_timer::SimulatedCounter;
///
/// let counter = SimulatedCounter::avr_16bit();
/// let port = SimulatedPort::new();
/// let mut decoder = PinChangeDecoder::new(&counter, &port, default_config()).expect("valid config");
/// decoder.initialize().expect("timer configured");
///
/// // Channel 0 is wired to line 1: 1.5 ms high pulse after a 20 ms gap
/// counter.advance(40_000);
/// port.set_line(1, true);
/// decoder.on_pin_change();
/// counter.advance(3_000);
/// port.set_line(1, false);
/// decoder.on_pin_change();
///
/// assert_eq!(decoder.get_channel_value(0), 1_500);
/// ```
pub struct PinChangeDecoder<C, P> {
    timer: TimerService<C>,
    port: P,
    config: ReceiverConfig,
    engine: CaptureEngine,
    mask: u8,
    last_levels: Mutex<Cell<u8>>,
}

impl<C: FreeRunningCounter, P: PinChangePort> PinChangeDecoder<C, P> {
    /// Create a decoder. Hardware is untouched until
    /// [`initialize`](ReceiverDecoder::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or binds a line
    /// outside the port.
    pub fn new(counter: C, port: P, config: ReceiverConfig) -> CaptureResult<Self> {
        config.validate()?;
        config.validate_pins_below(PORT_WIDTH)?;
        let mask = config
            .bindings()
            .fold(0u8, |mask, (_, pin)| mask | line_bit(pin));
        Ok(Self {
            timer: TimerService::new(counter),
            port,
            engine: CaptureEngine::new(&config),
            config,
            mask,
            last_levels: Mutex::new(Cell::new(0)),
        })
    }

    /// Pin-change interrupt entry point.
    pub fn on_pin_change(&self) {
        critical_section::with(|cs| {
            let now = self.timer.read_now_torn();
            let current = self.port.read_port();
            let previous = self.last_levels.borrow(cs).replace(current);
            let changed = (current ^ previous) & self.mask;
            if changed == 0 {
                return;
            }
            let timer = self.timer.state();
            for (channel, pin) in self.config.bindings() {
                let bit = line_bit(pin);
                if changed & bit != 0 {
                    let edge = Edge::from_level(current & bit != 0);
                    self.engine.on_edge(cs, channel, edge, now, &timer);
                }
            }
        });
    }

    /// Timer overflow interrupt entry point.
    pub fn on_timer_overflow(&self) {
        critical_section::with(|cs| {
            self.engine.on_timer_wrap(cs);
        });
    }

    /// Lines with the pin-change interrupt enabled.
    #[must_use]
    pub fn mask(&self) -> u8 {
        self.mask
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

impl<C: FreeRunningCounter, P: PinChangePort> ReceiverDecoder for PinChangeDecoder<C, P> {
    fn initialize(&mut self) -> CaptureResult<()> {
        self.timer.init_free_running(Prescaler::Div8)?;
        self.timer.enable_overflow_notification();
        critical_section::with(|cs| {
            self.engine.reset(cs);
            self.last_levels.borrow(cs).set(self.port.read_port());
        });
        self.port.set_interrupt_mask(self.mask);
        self.timer.start();
        tracing::info!(
            channels = self.config.channel_count,
            mask = self.mask,
            gap_check = self.config.gap_window.is_some(),
            "Pin-change decoder initialized"
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

impl<C, P> fmt::Debug for PinChangeDecoder<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinChangeDecoder")
            .field("config", &self.config)
            .field("mask", &self.mask)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

fn line_bit(pin: u8) -> u8 {
    1u8.checked_shl(u32::from(pin)).unwrap_or(0)
}
