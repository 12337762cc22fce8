//! Pulse-position (sum signal) decoder.
//!
//! One capture unit watches a composite train carrying every channel. Only
//! rising edges are captured; the interval between two rises is one slot.
//! A low-rate sync gap closes each frame:
//!
//! ```text
//!   |  slot 0  |  slot 1  | ... |  slot 7  |      sync gap      |  slot 0
//! __|‾|________|‾|________|‾...‾|‾|________|‾|__________________|‾|____
//!   ^          ^                           ^                    ^
//!   rise       rise                        rise                 rise
//! ```
//!
//! Slots are numbered from the sync gap. Logical channel `c` reads the slot
//! named by `config.pins[c]`, so the channel order of a transmitter family
//! is just a pin map; [`SumOrder`] provides the common ones.

use core::cell::Cell;
use core::fmt;

use critical_section::{CriticalSection, Mutex};
use rcin_capture::{
    CENTER_US, CaptureEngine, CaptureError, CaptureResult, CaptureStats, ChannelReading, Edge,
    EdgeOutcome, MAX_CHANNELS, PulseValidator, PulseWindow, ReceiverConfig, ReceiverDecoder,
};
use rcin_timer::{FreeRunningCounter, Prescaler, TimerService, TimerSetup};

use crate::hal::CaptureUnits;

/// Slot order of the channels in a sum signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SumOrder {
    /// Pitch, yaw, throttle, roll first (Graupner, Spektrum).
    #[default]
    GraupnerSpektrum,
    /// Roll, pitch, throttle, yaw first (Robbe, Hitec, Futaba).
    RobbeHitecFutaba,
    /// Pitch, roll, throttle, yaw first (some Hitec and Sanwa sets).
    HitecSanwa,
}

impl SumOrder {
    /// Every preset.
    pub const ALL: [Self; 3] = [
        Self::GraupnerSpektrum,
        Self::RobbeHitecFutaba,
        Self::HitecSanwa,
    ];

    /// Train slot read by each logical channel.
    #[must_use]
    pub const fn slots(self) -> [u8; MAX_CHANNELS] {
        match self {
            Self::GraupnerSpektrum => [1, 2, 3, 0, 4, 5, 6, 7],
            Self::RobbeHitecFutaba => [0, 1, 3, 2, 4, 5, 6, 7],
            Self::HitecSanwa => [1, 0, 3, 2, 4, 5, 6, 7],
        }
    }
}

/// Eight channels in Graupner/Spektrum order, servo slot window, readings
/// centred until measured.
#[must_use]
pub fn default_config() -> ReceiverConfig {
    ReceiverConfig {
        channel_count: MAX_CHANNELS,
        pins: SumOrder::default().slots(),
        pulse_window: PulseWindow::PWM,
        gap_window: Some(PulseWindow::PPM_SYNC),
        initial_value_us: CENTER_US,
        ..ReceiverConfig::default()
    }
}

/// The first `channel_count` channels of a sum signal in `order`.
///
/// # Errors
///
/// Returns [`CaptureError::InvalidChannelCount`] unless
/// `1 <= channel_count <= MAX_CHANNELS`.
pub fn sum_config(order: SumOrder, channel_count: usize) -> CaptureResult<ReceiverConfig> {
    let slots = order.slots();
    let pins = slots
        .get(..channel_count)
        .ok_or(CaptureError::InvalidChannelCount {
            count: channel_count,
            max: MAX_CHANNELS,
        })?;
    ReceiverConfig::builder()
        .pins(pins)
        .pulse_window(PulseWindow::PWM)
        .gap_window(Some(PulseWindow::PPM_SYNC))
        .initial_value_us(CENTER_US)
        .build()
}

#[derive(Debug, Clone, Copy, Default)]
struct FrameState {
    last_rise: Option<u32>,
    slot: Option<u8>,
    silent_wraps: u8,
}

/// Decoder for a pulse-position train on one capture unit.
///
/// # Interrupt Entry Points
///
/// - `on_capture()`: from the capture interrupt of the sum unit
/// - `on_timer_overflow()`: from the timer's overflow interrupt
///
/// # Frame Rules
///
/// - An interval inside the sync window starts a frame at slot 0
/// - Any other interval before the first sync is counted as
///   unsynchronized
/// - A slot outside the pulse window is rejected and drops sync
/// - A slot past the last one the train can carry drops sync
///
/// # Example
///
/// ```rust
/// use rcin_backends::ppm::{PpmDecoder, default_config};
/// use rcin_backends::sim::SimulatedCaptureUnits;
/// use rcin_capture::ReceiverDecoder;
/// use rcin_timer::SimulatedCounter;
///
/// let counter = SimulatedCounter::avr_16bit();
/// let units = SimulatedCaptureUnits::new();
/// let mut decoder = PpmDecoder::new(&counter, &units, 0, default_config()).expect("valid config");
/// decoder.initialize().expect("timer configured");
///
/// // 0.5 us per tick: a 5 ms sync gap, then a 1100 us slot 0
/// for count in [0, 10_000, 12_200] {
///     units.latch(0, count);
///     decoder.on_capture();
/// }
///
/// // Graupner order puts slot 0 on channel 3
/// assert_eq!(decoder.get_channel_value(3), 1_100);
/// ```
pub struct PpmDecoder<C, U> {
    timer: TimerService<C>,
    units: U,
    unit: u8,
    config: ReceiverConfig,
    engine: CaptureEngine,
    frame: Mutex<Cell<FrameState>>,
}

impl<C: FreeRunningCounter, U: CaptureUnits> PpmDecoder<C, U> {
    /// Create a decoder reading the train on capture `unit`. Hardware is
    /// untouched until [`initialize`](ReceiverDecoder::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, maps a channel to a
    /// slot past [`MAX_CHANNELS`], or `unit` does not exist.
    pub fn new(counter: C, units: U, unit: u8, config: ReceiverConfig) -> CaptureResult<Self> {
        config.validate()?;
        config.validate_pins_below(u8::try_from(MAX_CHANNELS).unwrap_or(u8::MAX))?;
        let limit = units.unit_count();
        if unit >= limit {
            return Err(CaptureError::pin_out_of_range(0, unit, limit));
        }
        let sync = config.gap_window.unwrap_or(PulseWindow::PPM_SYNC);
        let validator = PulseValidator::new(config.pulse_window, Some(sync));
        Ok(Self {
            timer: TimerService::new(counter),
            units,
            unit,
            engine: CaptureEngine::with_validator(&config, validator),
            config,
            frame: Mutex::new(Cell::new(FrameState::default())),
        })
    }

    /// Capture interrupt entry point.
    pub fn on_capture(&self) {
        critical_section::with(|cs| {
            let cell = self.frame.borrow(cs);
            let mut frame = cell.get();
            let now = self.units.captured(self.unit);
            let interval_us = frame.last_rise.map_or(u32::MAX, |rise| {
                self.timer
                    .state()
                    .interval_us(rise, now, u32::from(frame.silent_wraps))
            });
            frame.slot = self.on_slot(cs, frame.slot, interval_us);
            frame.last_rise = Some(now);
            frame.silent_wraps = 0;
            cell.set(frame);
        });
    }

    fn on_slot(&self, cs: CriticalSection<'_>, slot: Option<u8>, interval_us: u32) -> Option<u8> {
        let counters = self.engine.counters();
        if self.engine.validator().accept_gap(interval_us) {
            counters.record(&EdgeOutcome::Armed);
            return Some(0);
        }
        let Some(slot) = slot.filter(|&slot| usize::from(slot) < MAX_CHANNELS) else {
            counters.record(&EdgeOutcome::Unsynchronized {
                gap_us: interval_us,
            });
            return None;
        };
        let outcome = self
            .config
            .channel_for_pin(slot)
            .and_then(|channel| self.engine.on_interval(cs, channel, interval_us));
        match outcome {
            Some(EdgeOutcome::Accepted { .. }) => slot.checked_add(1),
            Some(_) => None,
            None if self.engine.validator().accept(interval_us) => {
                counters.record(&EdgeOutcome::Discarded {
                    width_us: interval_us,
                });
                slot.checked_add(1)
            }
            None => {
                counters.record(&EdgeOutcome::RejectedWidth {
                    width_us: interval_us,
                });
                None
            }
        }
    }

    /// Timer overflow interrupt entry point.
    pub fn on_timer_overflow(&self) {
        critical_section::with(|cs| {
            let cell = self.frame.borrow(cs);
            let mut frame = cell.get();
            frame.silent_wraps = frame.silent_wraps.saturating_add(1);
            cell.set(frame);
            self.engine.on_timer_wrap(cs);
        });
    }

    /// Next slot expected, or `None` while waiting for a sync gap.
    #[must_use]
    pub fn current_slot(&self) -> Option<u8> {
        critical_section::with(|cs| self.frame.borrow(cs).get().slot)
    }

    /// Capture unit carrying the train.
    #[must_use]
    pub fn unit(&self) -> u8 {
        self.unit
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

impl<C: FreeRunningCounter, U: CaptureUnits> ReceiverDecoder for PpmDecoder<C, U> {
    fn initialize(&mut self) -> CaptureResult<()> {
        let setup = self.timer.init_free_running(Prescaler::Div8)?;
        self.timer.enable_overflow_notification();
        critical_section::with(|cs| {
            self.engine.reset(cs);
            self.frame.borrow(cs).set(FrameState::default());
        });
        self.units.enable(self.unit, Edge::Rising);
        self.timer.reset();
        self.timer.start();
        tracing::info!(
            channels = self.config.channel_count,
            unit = self.unit,
            top = setup.top,
            "PPM decoder initialized"
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

impl<C, U> fmt::Debug for PpmDecoder<C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PpmDecoder")
            .field("unit", &self.unit)
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
