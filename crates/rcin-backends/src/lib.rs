//! # rcin-backends
//!
//! Hardware strategies for RC receiver decoding, built on `rcin-timer` and
//! `rcin-capture`.
//!
//! This crate provides four `#![no_std]` decoders, each behind a cargo
//! feature:
//! - `pin-change`: `PinChangeDecoder`, every channel armed on one shared
//!   pin-change interrupt, changed lines found by XOR against the last port
//!   read
//! - `time-division`: `TimeDivisionDecoder`, one external interrupt handed
//!   round-robin from channel to channel
//! - `input-capture`: `InputCaptureDecoder`, one hardware capture unit per
//!   channel with polarity flipped after every capture
//! - `ppm`: `PpmDecoder`, every channel multiplexed on one pulse-position
//!   sum signal read by a single capture unit
//!
//! All four implement [`ReceiverDecoder`](rcin_capture::ReceiverDecoder).
//! Interrupt handlers call the decoder's `on_*` entry points; the main loop
//! only reads channel values.
//!
//! ## Real-Time Safety
//!
//! - **No heap allocations**
//! - Interrupt work is bounded by the channel count
//! - Consumer reads are torn-free and never block
//!
//! ## Example
//!
//! ```rust
//! use rcin_backends::prelude::*;
//!
//! let counter = SimulatedCounter::avr_16bit();
//! let units = SimulatedCaptureUnits::new();
//! let config = ReceiverConfig::builder()
//!     .pins(&[0, 1, 2, 3])
//!     .pulse_window(PulseWindow::CAPTURE)
//!     .build()
//!     .expect("valid configuration");
//!
//! let mut decoder = InputCaptureDecoder::new(&counter, &units, config).expect("valid config");
//! decoder.initialize().expect("timer configured");
//!
//! units.latch(1, 10_000);
//! decoder.on_capture(1);
//! units.latch(1, 13_000);
//! decoder.on_capture(1);
//!
//! assert_eq!(decoder.get_channel_value(1), 1_500);
//! assert!(decoder.is_stale(0));
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod hal;
pub mod prelude;
pub mod scheduler;
pub mod sim;

#[cfg(feature = "input-capture")]
#[cfg_attr(docsrs, doc(cfg(feature = "input-capture")))]
pub mod input_capture;
#[cfg(feature = "pin-change")]
#[cfg_attr(docsrs, doc(cfg(feature = "pin-change")))]
pub mod pin_change;
#[cfg(feature = "ppm")]
#[cfg_attr(docsrs, doc(cfg(feature = "ppm")))]
pub mod ppm;
#[cfg(feature = "time-division")]
#[cfg_attr(docsrs, doc(cfg(feature = "time-division")))]
pub mod time_division;

pub use hal::{CaptureUnits, PinChangePort, PinInterrupts};
pub use scheduler::RoundRobin;

#[cfg(feature = "input-capture")]
pub use input_capture::InputCaptureDecoder;
#[cfg(feature = "pin-change")]
pub use pin_change::PinChangeDecoder;
#[cfg(feature = "ppm")]
pub use ppm::{PpmDecoder, SumOrder};
#[cfg(feature = "time-division")]
pub use time_division::TimeDivisionDecoder;
