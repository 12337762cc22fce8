//! Hardware capabilities consumed by the decoders.
//!
//! Register layout is MCU-specific and lives in the board crate; the
//! decoders only need the operations below. Methods take `&self` the way
//! peripheral register blocks do.

use rcin_capture::Edge;

/// A GPIO port whose lines share one pin-change interrupt.
///
/// # Implementation Requirements
///
/// 1. `read_port()` MUST return the level of all lines in one read
/// 2. The interrupt MUST fire on any enabled line changing, in either
///    direction, and the board handler MUST forward it to the decoder
pub trait PinChangePort {
    /// Current level of every line, bit `n` for line `n`.
    fn read_port(&self) -> u8;

    /// Enable the pin-change interrupt for the lines set in `mask`.
    fn set_interrupt_mask(&self, mask: u8);
}

/// Per-pin external interrupts with selectable edge.
///
/// # Implementation Requirements
///
/// 1. At most one edge is attached per pin; `attach()` replaces it
/// 2. The board handler MUST forward `(pin, edge)` to the decoder
pub trait PinInterrupts {
    /// Number of pins that can carry an external interrupt.
    fn pin_count(&self) -> u8;

    /// Fire on `edge` of `pin`.
    fn attach(&self, pin: u8, edge: Edge);

    /// Stop firing for `pin`.
    fn detach(&self, pin: u8);
}

/// Capture-compare units sharing one free-running timer.
///
/// # Implementation Requirements
///
/// 1. On the armed edge the unit MUST latch the timer count in hardware
/// 2. `captured()` MUST return the count latched by the last capture
/// 3. The board handler MUST forward each capture to the decoder with the
///    unit index
pub trait CaptureUnits {
    /// Number of capture units.
    fn unit_count(&self) -> u8;

    /// Arm `unit` for `edge` and enable its capture interrupt.
    fn enable(&self, unit: u8, edge: Edge);

    /// Count latched by the last capture on `unit`.
    fn captured(&self, unit: u8) -> u32;

    /// Edge `unit` is currently armed for.
    fn polarity(&self, unit: u8) -> Edge;

    /// Re-arm `unit` for `edge`.
    fn set_polarity(&self, unit: u8, edge: Edge);
}

impl<T: PinChangePort + ?Sized> PinChangePort for &T {
    fn read_port(&self) -> u8 {
        (**self).read_port()
    }

    fn set_interrupt_mask(&self, mask: u8) {
        (**self).set_interrupt_mask(mask);
    }
}

impl<T: PinInterrupts + ?Sized> PinInterrupts for &T {
    fn pin_count(&self) -> u8 {
        (**self).pin_count()
    }

    fn attach(&self, pin: u8, edge: Edge) {
        (**self).attach(pin, edge);
    }

    fn detach(&self, pin: u8) {
        (**self).detach(pin);
    }
}

impl<T: CaptureUnits + ?Sized> CaptureUnits for &T {
    fn unit_count(&self) -> u8 {
        (**self).unit_count()
    }

    fn enable(&self, unit: u8, edge: Edge) {
        (**self).enable(unit, edge);
    }

    fn captured(&self, unit: u8) -> u32 {
        (**self).captured(unit)
    }

    fn polarity(&self, unit: u8) -> Edge {
        (**self).polarity(unit)
    }

    fn set_polarity(&self, unit: u8, edge: Edge) {
        (**self).set_polarity(unit, edge);
    }
}
