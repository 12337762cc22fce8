//! Receiver configuration: channel count, pin bindings and validation windows.

use crate::error::{CaptureError, CaptureResult};

/// Largest number of logical channels a decoder can carry.
pub const MAX_CHANNELS: usize = 8;

/// Reading reported by a channel that has never been measured or has gone
/// dead.
pub const NO_SIGNAL_US: u16 = 0;

/// Stick-centre pulse width, usable as an alternative initial value.
pub const CENTER_US: u16 = 1_500;

/// Silent timer wraps before a channel is declared dead.
pub const DEFAULT_TIMEOUT_WRAPS: u8 = 2;

/// Inclusive window of plausible durations in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWindow {
    /// Shortest accepted duration.
    pub min_us: u32,
    /// Longest accepted duration.
    pub max_us: u32,
}

impl PulseWindow {
    /// Servo PWM high time.
    pub const PWM: Self = Self::new(950, 2_075);

    /// Low time between two pulses of the same channel in a PWM frame.
    pub const PWM_FRAME_GAP: Self = Self::new(12_000, 24_000);

    /// Sync gap closing a pulse-position frame. Anything this long cannot be
    /// a channel slot.
    pub const PPM_SYNC: Self = Self::new(3_000, 24_000);

    /// High time accepted by capture-unit receivers (strictly between 900
    /// and 2100 us).
    pub const CAPTURE: Self = Self::new(901, 2_099);

    /// Create a window without validation.
    #[must_use]
    pub const fn new(min_us: u32, max_us: u32) -> Self {
        Self { min_us, max_us }
    }

    /// Create a window, rejecting `min_us > max_us`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidWindow`] if the bounds are inverted.
    pub fn try_new(min_us: u32, max_us: u32) -> CaptureResult<Self> {
        let window = Self::new(min_us, max_us);
        if window.is_valid() {
            Ok(window)
        } else {
            Err(CaptureError::invalid_window(min_us, max_us))
        }
    }

    /// Whether `us` lies inside the window, bounds included.
    #[must_use]
    pub const fn contains(&self, us: u32) -> bool {
        self.min_us <= us && us <= self.max_us
    }

    /// Whether the bounds are ordered.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.min_us <= self.max_us
    }
}

impl Default for PulseWindow {
    fn default() -> Self {
        Self::PWM
    }
}

/// Static receiver configuration.
///
/// Channel `i` is bound to `pins[i]`; for capture-unit backends the "pin" is
/// the capture unit index. Bindings do not change after initialization.
///
/// # Example
///
/// ```rust
/// use rcin_capture::{PulseWindow, ReceiverConfig};
///
/// let config = ReceiverConfig::builder()
///     .pins(&[1, 2, 3, 0, 4, 5])
///     .gap_window(Some(PulseWindow::PWM_FRAME_GAP))
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.channel_count, 6);
/// assert_eq!(config.pin(3), Some(0));
/// assert_eq!(config.channel_for_pin(0), Some(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Number of logical channels in use (`1..=MAX_CHANNELS`).
    pub channel_count: usize,
    /// Channel to pin (or capture unit) map. Entries past `channel_count`
    /// are ignored.
    pub pins: [u8; MAX_CHANNELS],
    /// Accepted high-time window.
    pub pulse_window: PulseWindow,
    /// Accepted low-time window before a rise. `None` disables frame
    /// synchronization.
    pub gap_window: Option<PulseWindow>,
    /// Reading reported before the first valid measurement.
    pub initial_value_us: u16,
    /// Silent timer wraps before a channel is declared dead.
    pub timeout_wraps: u8,
}

impl ReceiverConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel count is out of range, a pin is bound
    /// twice, a window is inverted, the pulse window exceeds a 16-bit reading,
    /// or the timeout is zero.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(CaptureError::InvalidChannelCount {
                count: self.channel_count,
                max: MAX_CHANNELS,
            });
        }
        let pulse = self.pulse_window;
        if !pulse.is_valid() || pulse.max_us > u32::from(u16::MAX) {
            return Err(CaptureError::invalid_window(pulse.min_us, pulse.max_us));
        }
        if let Some(gap) = self.gap_window
            && !gap.is_valid()
        {
            return Err(CaptureError::invalid_window(gap.min_us, gap.max_us));
        }
        if self.timeout_wraps == 0 {
            return Err(CaptureError::ZeroTimeout);
        }
        for (channel, pin) in self.bindings() {
            if self
                .bindings()
                .skip(channel + 1)
                .any(|(_, other)| other == pin)
            {
                return Err(CaptureError::DuplicatePin { pin });
            }
        }
        Ok(())
    }

    /// Check every bound pin is below `limit`, the number of pins or capture
    /// units a backend can address.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::PinOutOfRange`] for the first offending channel.
    pub fn validate_pins_below(&self, limit: u8) -> CaptureResult<()> {
        match self.bindings().find(|&(_, pin)| pin >= limit) {
            Some((channel, pin)) => Err(CaptureError::pin_out_of_range(channel, pin, limit)),
            None => Ok(()),
        }
    }

    /// Pin bound to `channel`, if the channel is configured.
    #[must_use]
    pub fn pin(&self, channel: usize) -> Option<u8> {
        if channel < self.channel_count {
            self.pins.get(channel).copied()
        } else {
            None
        }
    }

    /// Channel bound to `pin`, if any.
    #[must_use]
    pub fn channel_for_pin(&self, pin: u8) -> Option<usize> {
        self.bindings()
            .find(|&(_, bound)| bound == pin)
            .map(|(channel, _)| channel)
    }

    /// Configured `(channel, pin)` pairs in channel order.
    pub fn bindings(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.pins
            .iter()
            .copied()
            .enumerate()
            .take(self.channel_count.min(MAX_CHANNELS))
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            channel_count: MAX_CHANNELS,
            pins: [0, 1, 2, 3, 4, 5, 6, 7],
            pulse_window: PulseWindow::PWM,
            gap_window: None,
            initial_value_us: NO_SIGNAL_US,
            timeout_wraps: DEFAULT_TIMEOUT_WRAPS,
        }
    }
}

/// Builder for `ReceiverConfig`.
#[derive(Debug, Default)]
pub struct ReceiverConfigBuilder {
    config: ReceiverConfig,
    requested_pins: Option<usize>,
}

impl ReceiverConfigBuilder {
    /// Bind channels to pins in order; also sets the channel count.
    #[must_use]
    pub fn pins(mut self, pins: &[u8]) -> Self {
        for (slot, pin) in self.config.pins.iter_mut().zip(pins) {
            *slot = *pin;
        }
        self.config.channel_count = pins.len();
        self.requested_pins = Some(pins.len());
        self
    }

    /// Use the first `count` entries of the current pin map.
    #[must_use]
    pub fn channel_count(mut self, count: usize) -> Self {
        self.config.channel_count = count;
        self.requested_pins = None;
        self
    }

    /// Set the accepted high-time window.
    #[must_use]
    pub fn pulse_window(mut self, window: PulseWindow) -> Self {
        self.config.pulse_window = window;
        self
    }

    /// Set or clear the accepted low-time window.
    #[must_use]
    pub fn gap_window(mut self, window: Option<PulseWindow>) -> Self {
        self.config.gap_window = window;
        self
    }

    /// Set the reading reported before the first valid measurement.
    #[must_use]
    pub fn initial_value_us(mut self, us: u16) -> Self {
        self.config.initial_value_us = us;
        self
    }

    /// Set the number of silent timer wraps before a channel is dead.
    #[must_use]
    pub fn timeout_wraps(mut self, wraps: u8) -> Self {
        self.config.timeout_wraps = wraps;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> CaptureResult<ReceiverConfig> {
        if let Some(count) = self.requested_pins
            && count > MAX_CHANNELS
        {
            return Err(CaptureError::InvalidChannelCount {
                count,
                max: MAX_CHANNELS,
            });
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReceiverConfig::default();
        assert_eq!(config.channel_count, MAX_CHANNELS);
        assert_eq!(config.pulse_window, PulseWindow::PWM);
        assert_eq!(config.initial_value_us, NO_SIGNAL_US);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let window = PulseWindow::PWM;
        assert!(window.contains(950));
        assert!(window.contains(2_075));
        assert!(!window.contains(949));
        assert!(!window.contains(2_076));
    }

    #[test]
    fn test_capture_window_excludes_legacy_bounds() {
        assert!(!PulseWindow::CAPTURE.contains(900));
        assert!(!PulseWindow::CAPTURE.contains(2_100));
        assert!(PulseWindow::CAPTURE.contains(1_500));
    }

    #[test]
    fn test_sync_gap_longer_than_any_pulse() {
        for pulse in [PulseWindow::PWM, PulseWindow::CAPTURE] {
            assert!(!PulseWindow::PPM_SYNC.contains(pulse.max_us));
        }
        assert!(PulseWindow::PPM_SYNC.contains(20_000));
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert_eq!(
            PulseWindow::try_new(2_000, 1_000),
            Err(CaptureError::invalid_window(2_000, 1_000))
        );
        let result = ReceiverConfig::builder()
            .pulse_window(PulseWindow::new(2_000, 1_000))
            .build();
        assert!(matches!(result, Err(CaptureError::InvalidWindow { .. })));
    }

    #[test]
    fn test_pulse_window_must_fit_reading() {
        let result = ReceiverConfig::builder()
            .pulse_window(PulseWindow::new(1_000, 70_000))
            .build();
        assert!(matches!(result, Err(CaptureError::InvalidWindow { .. })));
    }

    #[test]
    fn test_too_many_pins_rejected() {
        let result = ReceiverConfig::builder()
            .pins(&[0, 1, 2, 3, 4, 5, 6, 7, 8])
            .build();
        assert!(matches!(
            result,
            Err(CaptureError::InvalidChannelCount { count: 9, max: 8 })
        ));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let result = ReceiverConfig::builder().channel_count(0).build();
        assert!(matches!(
            result,
            Err(CaptureError::InvalidChannelCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let result = ReceiverConfig::builder().pins(&[1, 2, 1]).build();
        assert_eq!(result, Err(CaptureError::DuplicatePin { pin: 1 }));
    }

    #[test]
    fn test_duplicate_high_pin_rejected() {
        let result = ReceiverConfig::builder().pins(&[40, 41, 40]).build();
        assert_eq!(result, Err(CaptureError::DuplicatePin { pin: 40 }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ReceiverConfig::builder().timeout_wraps(0).build();
        assert_eq!(result, Err(CaptureError::ZeroTimeout));
    }

    #[test]
    fn test_pin_limit() -> CaptureResult<()> {
        let config = ReceiverConfig::builder().pins(&[0, 5, 9]).build()?;
        assert_eq!(
            config.validate_pins_below(8),
            Err(CaptureError::pin_out_of_range(2, 9, 8))
        );
        assert_eq!(config.validate_pins_below(16), Ok(()));
        Ok(())
    }

    #[test]
    fn test_binding_lookup() -> CaptureResult<()> {
        let config = ReceiverConfig::builder().pins(&[1, 2, 3, 0]).build()?;
        assert_eq!(config.pin(0), Some(1));
        assert_eq!(config.pin(4), None);
        assert_eq!(config.channel_for_pin(0), Some(3));
        // Pin map entries past the channel count are not bound
        assert_eq!(config.channel_for_pin(5), None);
        Ok(())
    }
}
