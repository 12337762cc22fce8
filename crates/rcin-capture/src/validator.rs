//! Pulse plausibility checks.

use crate::config::{PulseWindow, ReceiverConfig};

/// Accepts or rejects measured high times and, optionally, the low time
/// that preceded them.
///
/// # Example
///
/// ```rust
/// use rcin_capture::{PulseValidator, PulseWindow};
///
/// let validator = PulseValidator::new(PulseWindow::PWM, Some(PulseWindow::PWM_FRAME_GAP));
/// assert!(validator.accept(1_500));
/// assert!(!validator.accept(750));
/// assert!(validator.accept_gap(18_000));
/// assert!(!validator.accept_gap(3_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseValidator {
    pulse: PulseWindow,
    gap: Option<PulseWindow>,
}

impl PulseValidator {
    /// Create a validator from a pulse window and an optional gap window.
    #[must_use]
    pub const fn new(pulse: PulseWindow, gap: Option<PulseWindow>) -> Self {
        Self { pulse, gap }
    }

    /// Validator using the windows of `config`.
    #[must_use]
    pub const fn from_config(config: &ReceiverConfig) -> Self {
        Self::new(config.pulse_window, config.gap_window)
    }

    /// Same pulse window, gap check disabled.
    #[must_use]
    pub const fn without_gap(self) -> Self {
        Self::new(self.pulse, None)
    }

    /// Whether a high time of `width_us` is plausible.
    #[must_use]
    pub const fn accept(&self, width_us: u32) -> bool {
        self.pulse.contains(width_us)
    }

    /// Whether a low time of `gap_us` proves frame synchronization. Always
    /// true without a gap window.
    #[must_use]
    pub const fn accept_gap(&self, gap_us: u32) -> bool {
        match self.gap {
            Some(window) => window.contains(gap_us),
            None => true,
        }
    }

    /// Accepted high-time window.
    #[must_use]
    pub const fn pulse_window(&self) -> PulseWindow {
        self.pulse
    }

    /// Accepted low-time window, if frame synchronization is enabled.
    #[must_use]
    pub const fn gap_window(&self) -> Option<PulseWindow> {
        self.gap
    }
}

impl Default for PulseValidator {
    fn default() -> Self {
        Self::new(PulseWindow::PWM, None)
    }
}
