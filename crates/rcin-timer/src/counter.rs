//! Hardware counter capability.
//!
//! This module defines the register-level operations a free-running counter
//! must expose. Register layout is MCU-specific and lives in the board crate.

use crate::prescale::Prescaler;

/// Free-running hardware counter.
///
/// Methods take `&self` the way peripheral register blocks do, so a counter
/// can be shared between the main loop and interrupt handlers.
///
/// # Implementation Requirements
///
/// 1. `count()` MUST be callable from interrupt context
/// 2. `disable_clock()` MUST freeze the count
/// 3. The counter MUST wrap from `top` back to zero and, when the overflow
///    interrupt is enabled, raise exactly one overflow notification per wrap
pub trait FreeRunningCounter {
    /// Number of distinct values the hardware register can hold
    /// (65536 for a 16-bit counter).
    fn resolution(&self) -> u32;

    /// Counter input clock before prescaling, in hertz.
    fn input_clock_hz(&self) -> u32;

    /// Read the raw count.
    fn count(&self) -> u32;

    /// Write the raw count.
    fn set_count(&self, value: u32);

    /// Set the wrap target; the counter runs `0..=top`.
    fn set_top(&self, top: u32);

    /// Gate the input clock on with the given prescaler.
    fn enable_clock(&self, prescaler: Prescaler);

    /// Gate the input clock off.
    fn disable_clock(&self);

    /// Enable or disable the wrap (overflow) interrupt.
    fn set_overflow_interrupt(&self, enabled: bool);
}

impl<T: FreeRunningCounter + ?Sized> FreeRunningCounter for &T {
    fn resolution(&self) -> u32 {
        (**self).resolution()
    }

    fn input_clock_hz(&self) -> u32 {
        (**self).input_clock_hz()
    }

    fn count(&self) -> u32 {
        (**self).count()
    }

    fn set_count(&self, value: u32) {
        (**self).set_count(value);
    }

    fn set_top(&self, top: u32) {
        (**self).set_top(top);
    }

    fn enable_clock(&self, prescaler: Prescaler) {
        (**self).enable_clock(prescaler);
    }

    fn disable_clock(&self) {
        (**self).disable_clock();
    }

    fn set_overflow_interrupt(&self, enabled: bool) {
        (**self).set_overflow_interrupt(enabled);
    }
}
