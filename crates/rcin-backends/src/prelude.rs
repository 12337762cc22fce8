//! Prelude for rcin-backends.
//!
//! Re-exports the decoders, hardware traits, simulated peripherals and the
//! commonly used types of `rcin-timer` and `rcin-capture`.

pub use crate::hal::{CaptureUnits, PinChangePort, PinInterrupts};
pub use crate::scheduler::RoundRobin;
pub use crate::sim::{SimulatedCaptureUnits, SimulatedPinInterrupts, SimulatedPort};

#[cfg(feature = "input-capture")]
pub use crate::input_capture::InputCaptureDecoder;
#[cfg(feature = "pin-change")]
pub use crate::pin_change::PinChangeDecoder;
#[cfg(feature = "ppm")]
pub use crate::ppm::{PpmDecoder, SumOrder};
#[cfg(feature = "time-division")]
pub use crate::time_division::TimeDivisionDecoder;

pub use rcin_capture::prelude::*;
pub use rcin_timer::prelude::*;
