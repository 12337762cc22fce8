//! Simulated peripherals for host testing.
//!
//! Each type records what the decoder asked of the hardware and lets a test
//! inject the signal side (line levels, latched counts). Interrupt delivery
//! stays with the test, which calls the decoder's entry points directly.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use rcin_capture::Edge;

use crate::hal::{CaptureUnits, PinChangePort, PinInterrupts};

/// Pins modelled by [`SimulatedPinInterrupts`].
pub const SIMULATED_PIN_COUNT: u8 = 16;

/// Capture units modelled by [`SimulatedCaptureUnits`].
pub const SIMULATED_UNIT_COUNT: u8 = 8;

/// 8-line port with a pin-change interrupt mask.
///
/// # Example
///
/// ```rust
/// use rcin_backends::hal::PinChangePort;
/// use rcin_backends::sim::SimulatedPort;
///
/// let port = SimulatedPort::new();
/// port.set_line(3, true);
/// assert_eq!(port.read_port(), 0b0000_1000);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedPort {
    levels: AtomicU8,
    mask: AtomicU8,
}

impl SimulatedPort {
    /// Create a port with every line low and no interrupt enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            levels: AtomicU8::new(0),
            mask: AtomicU8::new(0),
        }
    }

    /// Drive every line at once.
    pub fn set_levels(&self, levels: u8) {
        self.levels.store(levels, Ordering::Release);
    }

    /// Drive one line. Lines past 7 are ignored.
    pub fn set_line(&self, line: u8, high: bool) {
        let bit = 1u8.checked_shl(u32::from(line)).unwrap_or(0);
        if high {
            self.levels.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.levels.fetch_and(!bit, Ordering::AcqRel);
        }
    }

    /// Lines with the pin-change interrupt enabled.
    #[must_use]
    pub fn interrupt_mask(&self) -> u8 {
        self.mask.load(Ordering::Acquire)
    }
}

impl PinChangePort for SimulatedPort {
    fn read_port(&self) -> u8 {
        self.levels.load(Ordering::Acquire)
    }

    fn set_interrupt_mask(&self, mask: u8) {
        self.mask.store(mask, Ordering::Release);
    }
}

const DETACHED: u8 = 0;
const ON_RISING: u8 = 1;
const ON_FALLING: u8 = 2;

/// Bank of external interrupt pins recording the attached edge.
#[derive(Debug)]
pub struct SimulatedPinInterrupts {
    attached: [AtomicU8; SIMULATED_PIN_COUNT as usize],
    attach_calls: AtomicU32,
}

impl SimulatedPinInterrupts {
    /// Create a bank with every pin detached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attached: core::array::from_fn(|_| AtomicU8::new(DETACHED)),
            attach_calls: AtomicU32::new(0),
        }
    }

    /// Edge currently attached to `pin`.
    #[must_use]
    pub fn attached(&self, pin: u8) -> Option<Edge> {
        match self.attached.get(usize::from(pin))?.load(Ordering::Acquire) {
            ON_RISING => Some(Edge::Rising),
            ON_FALLING => Some(Edge::Falling),
            _ => None,
        }
    }

    /// Pins with any edge attached.
    pub fn attached_pins(&self) -> impl Iterator<Item = u8> + '_ {
        (0..SIMULATED_PIN_COUNT).filter(|&pin| self.attached(pin).is_some())
    }

    /// Total `attach()` calls so far.
    #[must_use]
    pub fn attach_calls(&self) -> u32 {
        self.attach_calls.load(Ordering::Relaxed)
    }
}

impl Default for SimulatedPinInterrupts {
    fn default() -> Self {
        Self::new()
    }
}

impl PinInterrupts for SimulatedPinInterrupts {
    fn pin_count(&self) -> u8 {
        SIMULATED_PIN_COUNT
    }

    fn attach(&self, pin: u8, edge: Edge) {
        if let Some(slot) = self.attached.get(usize::from(pin)) {
            let code = match edge {
                Edge::Rising => ON_RISING,
                Edge::Falling => ON_FALLING,
            };
            slot.store(code, Ordering::Release);
            self.attach_calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn detach(&self, pin: u8) {
        if let Some(slot) = self.attached.get(usize::from(pin)) {
            slot.store(DETACHED, Ordering::Release);
        }
    }
}

#[derive(Debug)]
struct SimulatedUnit {
    latched: AtomicU32,
    rising: AtomicBool,
    enabled: AtomicBool,
}

impl SimulatedUnit {
    fn new() -> Self {
        Self {
            latched: AtomicU32::new(0),
            rising: AtomicBool::new(true),
            enabled: AtomicBool::new(false),
        }
    }
}

/// Capture units whose latched count is injected by the test.
///
/// # Example
///
/// ```rust
/// use rcin_backends::hal::CaptureUnits;
/// use rcin_backends::sim::SimulatedCaptureUnits;
/// use rcin_capture::Edge;
///
/// let units = SimulatedCaptureUnits::new();
/// units.enable(2, Edge::Rising);
/// units.latch(2, 12_345);
/// assert_eq!(units.captured(2), 12_345);
/// assert_eq!(units.polarity(2), Edge::Rising);
/// ```
#[derive(Debug)]
pub struct SimulatedCaptureUnits {
    units: [SimulatedUnit; SIMULATED_UNIT_COUNT as usize],
}

impl SimulatedCaptureUnits {
    /// Create units armed for rising edges, all disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: core::array::from_fn(|_| SimulatedUnit::new()),
        }
    }

    /// Latch `count` into `unit`, as the hardware does on the armed edge.
    pub fn latch(&self, unit: u8, count: u32) {
        if let Some(unit) = self.units.get(usize::from(unit)) {
            unit.latched.store(count, Ordering::Release);
        }
    }

    /// Whether `unit` has been enabled.
    #[must_use]
    pub fn is_enabled(&self, unit: u8) -> bool {
        self.units
            .get(usize::from(unit))
            .is_some_and(|unit| unit.enabled.load(Ordering::Acquire))
    }
}

impl Default for SimulatedCaptureUnits {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureUnits for SimulatedCaptureUnits {
    fn unit_count(&self) -> u8 {
        SIMULATED_UNIT_COUNT
    }

    fn enable(&self, unit: u8, edge: Edge) {
        if let Some(slot) = self.units.get(usize::from(unit)) {
            slot.rising.store(edge == Edge::Rising, Ordering::Release);
            slot.enabled.store(true, Ordering::Release);
        }
    }

    fn captured(&self, unit: u8) -> u32 {
        self.units
            .get(usize::from(unit))
            .map_or(0, |unit| unit.latched.load(Ordering::Acquire))
    }

    fn polarity(&self, unit: u8) -> Edge {
        let rising = self
            .units
            .get(usize::from(unit))
            .is_none_or(|unit| unit.rising.load(Ordering::Acquire));
        Edge::from_level(rising)
    }

    fn set_polarity(&self, unit: u8, edge: Edge) {
        if let Some(slot) = self.units.get(usize::from(unit)) {
            slot.rising.store(edge == Edge::Rising, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_lines() {
        let port = SimulatedPort::new();
        port.set_levels(0b1010_0000);
        port.set_line(7, false);
        port.set_line(0, true);
        port.set_line(12, true);
        assert_eq!(port.read_port(), 0b0010_0001);
        port.set_interrupt_mask(0x0F);
        assert_eq!(port.interrupt_mask(), 0x0F);
    }

    #[test]
    fn test_pin_attach_detach() {
        let pins = SimulatedPinInterrupts::new();
        pins.attach(4, Edge::Rising);
        assert_eq!(pins.attached(4), Some(Edge::Rising));
        pins.attach(4, Edge::Falling);
        assert_eq!(pins.attached(4), Some(Edge::Falling));
        pins.detach(4);
        assert_eq!(pins.attached(4), None);
        assert_eq!(pins.attach_calls(), 2);
        // Out of range is ignored
        pins.attach(200, Edge::Rising);
        assert_eq!(pins.attached(200), None);
    }

    #[test]
    fn test_capture_polarity_toggle() {
        let units = SimulatedCaptureUnits::new();
        assert!(!units.is_enabled(1));
        units.enable(1, Edge::Rising);
        assert!(units.is_enabled(1));
        units.set_polarity(1, units.polarity(1).inverted());
        assert_eq!(units.polarity(1), Edge::Falling);
    }
}
